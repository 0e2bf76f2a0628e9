//! Error types for the call engine

use thiserror::Error;

use autodial_manager_client::ManagerError;

/// Result type for call engine operations
pub type Result<T> = std::result::Result<T, CallEngineError>;

/// Errors surfaced by the call engine.
///
/// None of these stop the dial loop: submission failures are skipped and
/// store failures are logged. They reach callers only through the operator
/// facing operations (batch start, agent selection, line claims).
#[derive(Debug, Error)]
pub enum CallEngineError {
    /// Manager client error
    #[error("Manager error: {0}")]
    Manager(#[from] ManagerError),

    /// Call store error
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Agent script is not in the configured list
    #[error("Unknown agent script: {name}")]
    UnknownAgent { name: String },

    /// Manager connection never came up
    #[error("Manager connection not established after {seconds} seconds")]
    ConnectTimeout { seconds: u64 },
}

impl CallEngineError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
