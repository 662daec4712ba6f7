//! Error types for Runner-RL

use thiserror::Error;

/// Result type for Runner-RL operations
pub type Result<T> = std::result::Result<T, RunnerError>;

/// Runner-RL error types
///
/// The simulation itself never fails: a collision is a terminal state, not an
/// error. These variants cover the seams around it (configuration, policy
/// blobs, persistence).
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(String),

    /// Policy could not restore its parameters
    #[error("Policy error: {0}")]
    Policy(String),

    /// Persistence backend error
    #[error("Store error: {0}")]
    Store(String),
}

impl From<serde_json::Error> for RunnerError {
    fn from(err: serde_json::Error) -> Self {
        RunnerError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for RunnerError {
    fn from(err: std::io::Error) -> Self {
        RunnerError::Io(err.to_string())
    }
}
