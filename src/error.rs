use thiserror::Error;

/// The flat error taxonomy surfaced by the core. Each failure carries
/// exactly one tag; per-document recoveries (a malformed study article,
/// a missing TOC link) never reach this type — they are logged and
/// skipped at the point of discovery instead.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid filename: {0}")]
    InvalidFilename(String),

    #[error("unsupported issue: {0}")]
    UnsupportedIssue(String),

    #[error("unsupported container format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    #[error("file too large: {0}")]
    FileTooLarge(String),

    #[error("too many files: {0}")]
    TooManyFiles(String),

    #[error("suspicious content: {0}")]
    SuspiciousContent(String),

    #[error("invalid database: {0}")]
    InvalidDatabase(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("malformed content: {0}")]
    MalformedContent(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Io(e.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
