use thiserror::Error;

/// Failures reported by [`SaveManager`](super::SaveManager).
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("save not found: {0}")]
    NotFound(String),

    #[error("invalid save name: {0:?}")]
    InvalidName(String),

    #[error("save uses unsupported format version {0}")]
    UnsupportedVersion(u32),

    #[error("saved character class no longer exists: {0}")]
    UnknownClass(String),

    #[error("no run to save")]
    NoActiveRun,
}

pub type Result<T> = std::result::Result<T, SaveError>;
