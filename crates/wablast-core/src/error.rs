use thiserror::Error;

/// Top-level error type for wablast.
#[derive(Debug, Error)]
pub enum BlastError {
    /// The backend rejected a request or the transport failed.
    #[error("backend error: {0}")]
    Backend(String),

    /// The backend answered with a shape the client does not understand.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Connection-session error.
    #[error("session error: {0}")]
    Session(String),

    /// An action was rejected locally before any network call.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
