//! Errors returned by a generate-content call

use thiserror::Error;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Why a remote generation produced no usable response
///
/// Every variant is a failed call from the caller's point of view; none of
/// them carries partial output.
#[derive(Error, Debug)]
pub enum LLMError {
    /// Provider could not be built from its configuration
    #[error("invalid provider configuration: {0}")]
    Config(String),

    /// Request rejected before sending or with HTTP 400
    #[error("bad request: {0}")]
    BadRequest(String),

    /// HTTP 401 or 403
    #[error("API key rejected")]
    Unauthorized,

    /// HTTP 429
    #[error("quota exhausted: {0}")]
    RateLimited(String),

    /// HTTP 404 for the named model
    #[error("unknown model '{0}'")]
    ModelNotFound(String),

    /// Any other non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection failure or timeout
    #[cfg(feature = "gemini")]
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Success status, but the body was not a usable generate-content reply
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}
