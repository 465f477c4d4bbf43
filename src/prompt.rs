use crate::history::{ConversationHistory, Message};

pub const DEFAULT_HISTORY_WINDOW: usize = 10;

pub const SYSTEM_PROMPT: &str = "You are an intelligent PDF assistant with the following capabilities:

1. **Answer Questions**: Provide accurate answers based on the PDF content
2. **Cite Sources**: Reference specific sections or pages when answering
3. **Summarize**: Create concise summaries of document sections
4. **Extract Information**: Find and extract specific data points
5. **Compare**: Compare information across multiple documents

Guidelines:
- Always base answers on the provided PDF content
- If information is not in the document, clearly state: \"This information is not available in the provided document(s).\"
- Be concise but thorough
- Cite page numbers when possible

Remember: Your knowledge is limited to the provided PDF content only.";

const NO_DOCUMENT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. No documents are loaded, so answer from general knowledge.";

const SUMMARY_SYSTEM_PROMPT: &str =
    "You are a document summarization expert. Create concise, informative summaries.";

/// Messages for one question: system prompt, the document context if any,
/// the last `history_window` turns and finally the question itself.
///
/// `history` must not already contain `question`.
pub fn build_messages(
    context: &str,
    history: &ConversationHistory,
    history_window: usize,
    question: &str,
) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history_window + 3);
    if context.is_empty() {
        messages.push(Message::system(NO_DOCUMENT_SYSTEM_PROMPT));
    } else {
        messages.push(Message::system(SYSTEM_PROMPT));
        messages.push(Message::user(format!("PDF Content:\n\n{context}")));
    }
    messages.extend(history.recent(history_window));
    messages.push(Message::user(question));
    messages
}

pub fn summary_messages(text: &str, max_words: u32) -> Vec<Message> {
    vec![
        Message::system(SUMMARY_SYSTEM_PROMPT),
        Message::user(format!(
            "Summarize the following document in approximately {max_words} words:\n\n{text}"
        )),
    ]
}
