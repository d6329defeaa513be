use thiserror::Error;

/// A convenience `Result` alias using [`ClawdashError`].
pub type ClawdashResult<T> = Result<T, ClawdashError>;

/// Top-level error type for the clawdash crates.
///
/// Each variant corresponds to a layer that can fail. Framing and decoding
/// noise inside a response stream never surfaces here; it is absorbed by the
/// parser.
#[derive(Error, Debug)]
pub enum ClawdashError {
    /// Transport failure: connection refused, reset, or a failed body read.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The remote service answered with a non-success status code.
    #[error("API Error {status}: {body}")]
    Status {
        /// Numeric HTTP status code.
        status: u16,
        /// Response body, as text, for diagnostics.
        body: String,
    },

    /// A chat session refused the request (busy, empty input).
    #[error("Session error: {0}")]
    Session(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// A caller-supplied argument was rejected before any I/O.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The memory service reported `success: false`.
    #[error("Memory service error: {0}")]
    Memory(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClawdashError {
    /// HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClawdashError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
