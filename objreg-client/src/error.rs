//! Error types for the registry client

use thiserror::Error;

/// Registry client error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Transport-level failure on a single endpoint (connect refused,
    /// stream reset, non-OK status from a dead or unreachable server).
    #[error("RPC error: {0}")]
    Rpc(String),

    /// A single endpoint attempt exceeded the per-channel call timeout.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The RPC itself succeeded but a live server refused the request
    /// (`success = false` / `ok = false`). Kept separate from [`Error::Rpc`]
    /// so logs can tell a refusing server from an unreachable one.
    #[error("Rejected by {endpoint}: {operation}")]
    Rejected {
        endpoint: String,
        operation: &'static str,
    },

    /// Every endpoint in the set failed or timed out for one call.
    #[error("All {attempted} endpoints failed, last error: {last}")]
    Exhausted { attempted: usize, last: Box<Error> },
}

impl Error {
    /// Whether this error is an application-level rejection rather than
    /// a transport problem.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Result type for registry client operations
pub type Result<T> = std::result::Result<T, Error>;
