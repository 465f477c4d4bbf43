use crate::error::ConfigError;

pub const DEFAULT_CONTEXT_BUDGET: usize = 3000;
pub const DOCUMENT_DELIMITER: &str = "\n\n";
pub const TRUNCATION_MARKER: &str = "\n[Document truncated...]";

/// Joins document texts into the context sent next to a question, cut down
/// to a fixed character budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextAssembler {
    budget: usize,
}

impl ContextAssembler {
    pub fn new(budget: usize) -> Result<Self, ConfigError> {
        if budget == 0 {
            return Err(ConfigError::ZeroBudget);
        }
        Ok(Self { budget })
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Concatenate `texts` and truncate to the budget.
    ///
    /// When truncation happens the result is exactly `budget` characters of
    /// the joined text followed by [`TRUNCATION_MARKER`]. No texts means no
    /// context: the empty string is returned.
    pub fn assemble<S: AsRef<str>>(&self, texts: &[S]) -> String {
        let joined = texts
            .iter()
            .map(|t| t.as_ref())
            .collect::<Vec<&str>>()
            .join(DOCUMENT_DELIMITER);

        match joined.char_indices().nth(self.budget) {
            Some((cut, _)) => {
                tracing::debug!(
                    budget = self.budget,
                    total_chars = joined.chars().count(),
                    "context truncated"
                );
                let mut context = joined[..cut].to_string();
                context.push_str(TRUNCATION_MARKER);
                context
            }
            None => joined,
        }
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self {
            budget: DEFAULT_CONTEXT_BUDGET,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_documents_give_empty_context() {
        let assembler = ContextAssembler::new(3000).unwrap();
        let none: [&str; 0] = [];
        assert_eq!(assembler.assemble(&none), "");
    }

    #[test]
    fn test_joins_documents_with_delimiter() {
        let assembler = ContextAssembler::default();
        let context = assembler.assemble(&["first doc", "second doc"]);
        assert_eq!(context, "first doc\n\nsecond doc");
    }

    #[test]
    fn test_truncates_to_budget_and_marks() {
        let assembler = ContextAssembler::new(3000).unwrap();
        let context = assembler.assemble(&["x".repeat(5000)]);

        assert_eq!(context.len(), 3000 + TRUNCATION_MARKER.len());
        assert!(context.ends_with(TRUNCATION_MARKER));
        assert!(context.starts_with(&"x".repeat(3000)));
    }

    #[test]
    fn test_exactly_budget_is_not_truncated() {
        let assembler = ContextAssembler::new(10).unwrap();
        let context = assembler.assemble(&["abcd", "efgh"]);
        assert_eq!(context, "abcd\n\nefgh");
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let assembler = ContextAssembler::new(4).unwrap();
        let context = assembler.assemble(&["日本語のテキスト"]);
        assert_eq!(context, format!("日本語の{TRUNCATION_MARKER}"));
    }

    #[test]
    fn test_zero_budget_is_rejected() {
        assert_eq!(ContextAssembler::new(0), Err(ConfigError::ZeroBudget));
    }
}
