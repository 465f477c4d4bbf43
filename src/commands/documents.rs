use std::path::{Path, PathBuf};

use super::{AppState, CommandError};
use crate::chunker::Chunk;
use crate::doc_processor::{self, Document, PdfMetadata, TextStats};
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub name: String,
    pub pages: usize,
    pub chunks: usize,
    pub stats: TextStats,
    pub metadata: Option<PdfMetadata>,
}

#[derive(Debug, Default)]
pub struct ProcessReport {
    pub loaded: Vec<DocumentSummary>,
    /// File and reason for every file that could not be used.
    pub skipped: Vec<(String, String)>,
}

pub fn summarize_document(state: &AppState, document: &Document) -> DocumentSummary {
    let text = document.text();
    DocumentSummary {
        name: document.name.clone(),
        pages: document.pages().len(),
        chunks: state.chunker.spans(&text).len(),
        stats: doc_processor::text_stats(&text),
        metadata: document.metadata.clone(),
    }
}

/// Parse `paths` and make the successfully parsed files the session's
/// documents. Files that fail are reported, not fatal. When anything loads
/// the conversation starts over, since earlier turns refer to other documents.
pub fn process_documents(
    state: &AppState,
    session: &mut Session,
    paths: &[PathBuf],
) -> ProcessReport {
    let mut report = ProcessReport::default();
    let mut documents = Vec::with_capacity(paths.len());

    for path in paths {
        match doc_processor::parse_file(path) {
            Ok(document) => {
                report.loaded.push(summarize_document(state, &document));
                documents.push(document);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping document");
                report.skipped.push((path.display().to_string(), e.to_string()));
            }
        }
    }

    tracing::info!(
        loaded = report.loaded.len(),
        skipped = report.skipped.len(),
        "processed documents"
    );
    if !documents.is_empty() {
        session.history.clear();
    }
    session.replace_documents(documents);
    report
}

pub fn list_documents(state: &AppState, session: &Session) -> Vec<DocumentSummary> {
    session
        .documents()
        .iter()
        .map(|d| summarize_document(state, d))
        .collect()
}

pub fn clear(session: &mut Session) {
    session.clear();
    tracing::info!("session cleared");
}

/// Chunk windows of a single file, for inspecting how it would be split.
pub fn document_chunks(state: &AppState, path: &Path) -> Result<Vec<Chunk>, CommandError> {
    let document = doc_processor::parse_file(path)?;
    Ok(state.chunker.spans(&document.text()))
}

pub fn document_stats(state: &AppState, path: &Path) -> Result<DocumentSummary, CommandError> {
    let document = doc_processor::parse_file(path)?;
    Ok(summarize_document(state, &document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppSettings;
    use crate::history::Role;
    use std::fs;

    fn state_with(chunk_size: usize, chunk_overlap: usize) -> AppState {
        AppState::new(AppSettings {
            chunk_size,
            chunk_overlap,
            ..AppSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn test_process_replaces_documents_and_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("guide.txt");
        fs::write(&good, "Chapter one. Chapter two.").unwrap();
        let empty = dir.path().join("empty.md");
        fs::write(&empty, "   ").unwrap();
        let unsupported = dir.path().join("table.csv");
        fs::write(&unsupported, "a,b").unwrap();

        let state = state_with(10_000, 200);
        let mut session = Session::new(&state.settings).unwrap();
        session.history.add(Role::User, "What does the old report say?");
        session.history.add(Role::Assistant, "It covers last year.");

        let report = process_documents(&state, &mut session, &[good, empty, unsupported]);

        assert_eq!(report.loaded.len(), 1);
        assert_eq!(report.loaded[0].name, "guide.txt");
        assert_eq!(report.loaded[0].pages, 1);
        assert_eq!(report.loaded[0].chunks, 1);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(session.documents().len(), 1);
        assert!(session.history.is_empty());
        assert!(report.loaded[0].metadata.is_none());
    }

    #[test]
    fn test_failed_load_keeps_conversation() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");

        let state = state_with(10_000, 200);
        let mut session = Session::new(&state.settings).unwrap();
        session.history.add(Role::User, "still here");

        let report = process_documents(&state, &mut session, &[missing]);
        assert!(report.loaded.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(session.history.len(), 1);
    }

    #[test]
    fn test_document_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.txt");
        fs::write(&path, "word ".repeat(100)).unwrap();

        let state = state_with(100, 10);
        let chunks = document_chunks(&state, &path).unwrap();

        assert!(chunks.len() > 1);
        assert_eq!(chunks[0].start_offset, 0);
        assert_eq!(chunks[1].start_offset, chunks[0].end_offset - 10);
    }

    #[test]
    fn test_clear() {
        let state = state_with(10_000, 200);
        let mut session = Session::new(&state.settings).unwrap();
        session.history.add(Role::User, "hello");
        clear(&mut session);
        assert!(session.history.is_empty());
        assert!(list_documents(&state, &session).is_empty());
    }
}
