use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("not an image")]
    NotAnImage,
    #[error("no file")]
    NoFile,
}

/// Errors surfaced by view operations.
///
/// Transport failures never show up here: they are masked by the fallback caption.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("server error: status={status} message={message}")]
    Server { status: u16, message: String },

    #[error("clipboard write failed: {0}")]
    Clipboard(String),

    #[error("preview unavailable: {0}")]
    Preview(String),

    #[error("a caption request is already in flight")]
    Busy,

    #[error("request cancelled")]
    Cancelled,

    #[error("view has been torn down")]
    TornDown,
}
