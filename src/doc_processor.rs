use std::fs;
use std::path::Path;

/// One page of extracted text. Page numbers start at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub text: String,
}

/// Fields from a PDF's document information dictionary. Missing entries
/// read as "Unknown".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfMetadata {
    pub title: String,
    pub author: String,
    pub creator: String,
    /// Pages in the file, including ones without any text.
    pub pages: usize,
}

/// Text extracted from a single uploaded file.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub name: String,
    pages: Vec<Page>,
    /// Only set for PDFs whose structure could be read.
    pub metadata: Option<PdfMetadata>,
}

impl Document {
    /// Build a document from extracted pages. Page text is whitespace-normalized
    /// and pages left empty afterwards are dropped.
    pub fn from_pages(name: impl Into<String>, pages: Vec<Page>) -> Self {
        let pages = pages
            .into_iter()
            .map(|p| Page {
                number: p.number,
                text: clean_text(&p.text),
            })
            .filter(|p| !p.text.is_empty())
            .collect();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            pages,
            metadata: None,
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Full text with each page prefixed by a `[Page N]` label.
    pub fn text(&self) -> String {
        self.pages
            .iter()
            .map(|p| format!("[Page {}]\n{}", p.number, p.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("PDF parse error in {path}: {message}")]
    Pdf { path: String, message: String },
    #[error("Unsupported file type: .{0}")]
    Unsupported(String),
    #[error("{0} contains no extractable text")]
    Empty(String),
}

/// Parse a document file into per-page text
pub fn parse_file(path: &Path) -> Result<Document, DocumentError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();
    let display = path.display().to_string();

    let mut metadata = None;
    let pages = match ext.as_str() {
        "txt" | "md" | "markdown" => {
            let content = fs::read_to_string(path).map_err(|source| DocumentError::Io {
                path: display.clone(),
                source,
            })?;
            vec![Page {
                number: 1,
                text: content,
            }]
        }
        "pdf" => {
            let bytes = fs::read(path).map_err(|source| DocumentError::Io {
                path: display.clone(),
                source,
            })?;
            let pages = extract_pdf_pages(&display, &bytes)?;
            metadata = match pdf_metadata(&bytes) {
                Ok(meta) => Some(meta),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "could not read PDF metadata");
                    None
                }
            };
            pages
        }
        _ => return Err(DocumentError::Unsupported(ext)),
    };

    let mut document = Document::from_pages(name.clone(), pages);
    document.metadata = metadata;
    if document.is_empty() {
        return Err(DocumentError::Empty(name));
    }
    tracing::debug!(
        document = %document.name,
        pages = document.pages().len(),
        "parsed document"
    );
    Ok(document)
}

/// Extract text page by page. When the per-page pass fails the whole file is
/// extracted as one page; only if that fails too is the document rejected.
fn extract_pdf_pages(path: &str, bytes: &[u8]) -> Result<Vec<Page>, DocumentError> {
    match pdf_extract::extract_text_from_mem_by_pages(bytes) {
        Ok(texts) => Ok(texts
            .into_iter()
            .zip(1u32..)
            .map(|(text, number)| Page { number, text })
            .collect()),
        Err(e) => {
            tracing::warn!(path, error = %e, "per-page extraction failed, retrying whole document");
            let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| DocumentError::Pdf {
                path: path.to_string(),
                message: e.to_string(),
            })?;
            Ok(vec![Page { number: 1, text }])
        }
    }
}

/// Read title, author, creator and page count from a PDF.
pub fn pdf_metadata(bytes: &[u8]) -> Result<PdfMetadata, lopdf::Error> {
    let doc = lopdf::Document::load_mem(bytes)?;
    let info = doc
        .trailer
        .get(b"Info")
        .and_then(|info| doc.dereference(info))
        .and_then(|(_, info)| info.as_dict())
        .ok();
    let field = |key: &[u8]| {
        info.and_then(|dict| dict.get(key).ok())
            .and_then(|value| value.as_str().ok())
            .map(decode_pdf_string)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "Unknown".to_string())
    };

    Ok(PdfMetadata {
        title: field(b"Title"),
        author: field(b"Author"),
        creator: field(b"Creator"),
        pages: doc.get_pages().len(),
    })
}

/// Info strings are UTF-16BE when they start with a byte order mark,
/// otherwise they are read as UTF-8.
fn decode_pdf_string(bytes: &[u8]) -> String {
    match bytes.strip_prefix(b"\xFE\xFF") {
        Some(utf16) => {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        None => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Collapse every run of whitespace to a single space and trim the ends.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStats {
    pub characters: usize,
    pub words: usize,
    pub lines: usize,
    pub paragraphs: usize,
}

pub fn text_stats(text: &str) -> TextStats {
    TextStats {
        characters: text.chars().count(),
        words: text.split_whitespace().count(),
        lines: text.matches('\n').count(),
        paragraphs: text.split("\n\n").filter(|p| !p.trim().is_empty()).count(),
    }
}
