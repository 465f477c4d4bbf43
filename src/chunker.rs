use crate::error::ConfigError;

/// A window over a text. Offsets count characters, `end_offset` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub start_offset: usize,
    pub end_offset: usize,
    pub text: String,
}

/// Splits long text into overlapping windows, preferring to end a window
/// right after a sentence (`". "`) when one falls inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Chunker {
    pub const DEFAULT_CHUNK_SIZE: usize = 10_000;
    pub const DEFAULT_OVERLAP: usize = 200;

    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, ConfigError> {
        if chunk_size <= overlap {
            return Err(ConfigError::InvalidChunking {
                chunk_size,
                overlap,
            });
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split text into overlapping chunks.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        self.spans(text).into_iter().map(|c| c.text).collect()
    }

    /// Same windows as [`Chunker::chunk`], with their character offsets.
    pub fn spans(&self, text: &str) -> Vec<Chunk> {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        if len <= self.chunk_size {
            return vec![Chunk {
                start_offset: 0,
                end_offset: len,
                text: text.to_string(),
            }];
        }

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < len {
            let mut end = (start + self.chunk_size).min(len);

            if end < len {
                // A boundary is only usable if the next window still starts
                // past this one, otherwise the cursor would stall or rewind.
                if let Some(period) = rfind_sentence_end(&chars[start..end]) {
                    if period > 0 && period + 1 > self.overlap {
                        end = start + period + 1;
                    }
                }
            }

            chunks.push(Chunk {
                start_offset: start,
                end_offset: end,
                text: chars[start..end].iter().collect(),
            });

            if end >= len {
                break;
            }
            start = end - self.overlap;
        }

        chunks
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
            overlap: Self::DEFAULT_OVERLAP,
        }
    }
}

/// Index of the period in the last `". "` that lies entirely inside `window`.
fn rfind_sentence_end(window: &[char]) -> Option<usize> {
    window.windows(2).rposition(|w| w[0] == '.' && w[1] == ' ')
}
