use std::path::PathBuf;

/// Invalid parameters handed to the text pipeline or the settings layer.
///
/// These are never retried: they point at a bad configuration and are
/// surfaced to the user as-is.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("chunk overlap ({overlap}) must be smaller than chunk size ({chunk_size})")]
    InvalidChunking { chunk_size: usize, overlap: usize },
    #[error("context budget must be greater than zero")]
    ZeroBudget,
    #[error("max history must be greater than zero")]
    ZeroHistory,
    #[error("invalid setting `{key}`: {reason}")]
    InvalidSetting { key: String, reason: String },
    #[error("failed to read config file {path}: {reason}")]
    Read { path: PathBuf, reason: String },
    #[error("failed to parse config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}
