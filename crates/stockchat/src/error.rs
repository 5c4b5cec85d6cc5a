//! Error types for the query and analytics pipeline

use stockchat_llm::LLMError;
use thiserror::Error;

/// Pipeline errors
///
/// Most variants never reach the user: remote failures and malformed model
/// output are recovered by the deterministic fallbacks. Only [`NoData`] and
/// [`Computation`] are turned into user-visible failure strings.
///
/// [`NoData`]: StockError::NoData
/// [`Computation`]: StockError::Computation
#[derive(Debug, Error)]
pub enum StockError {
    /// The requested ticker and range produced an empty series
    #[error("No data found")]
    NoData,

    /// Remote model call failed (network, timeout, non-success status)
    #[error("Remote model error: {0}")]
    RemoteCall(#[from] LLMError),

    /// Remote model answered, but without usable text or JSON
    #[error("Malformed model output: {0}")]
    MalformedOutput(String),

    /// A statistic could not be computed from the series
    #[error("Computation error: {0}")]
    Computation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Price store could not be read
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Prompt template failed to render
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Chat command could not be parsed
    #[error("Command error: {0}")]
    CommandError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, StockError>;

impl StockError {
    /// Whether a deterministic fallback should take over
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::RemoteCall(_) | Self::MalformedOutput(_))
    }
}
