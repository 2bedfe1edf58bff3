use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid store path: {0}")]
    InvalidPath(String),

    #[error("store key mismatch: connection is bound to '{expected}', got '{actual}'")]
    ForeignKey { expected: String, actual: String },

    #[error("store channel closed")]
    Closed,
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("record source not found: {0}")]
    NotFound(PathBuf),

    #[error("record parse error: {0}")]
    ParseError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum KingdomError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("identity error: {0}")]
    Identity(String),
}
