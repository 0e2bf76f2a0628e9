//! Error types for the manager client

use thiserror::Error;

/// Result type for manager client operations
pub type Result<T> = std::result::Result<T, ManagerError>;

/// Errors that can occur while talking to the manager interface
#[derive(Debug, Error)]
pub enum ManagerError {
    /// Socket level failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The client has no authenticated session right now
    #[error("Not connected to the manager interface")]
    NotConnected,

    /// The session dropped while an action was waiting for its response
    #[error("Connection lost while waiting for response to action {action_id}")]
    ConnectionLost { action_id: String },

    /// Login was rejected by the switch
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// The switch answered an action with `Response: Error`
    #[error("Action {action} failed: {message}")]
    ActionFailed { action: String, message: String },

    /// No response arrived within the action timeout
    #[error("Action {action_id} timed out after {millis} ms")]
    Timeout { action_id: String, millis: u64 },

    /// The peer sent something that is not a manager frame
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// The client was closed explicitly
    #[error("Client closed")]
    Closed,
}

impl ManagerError {
    /// Create a protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Create an action failure
    pub fn action_failed(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ActionFailed {
            action: action.into(),
            message: message.into(),
        }
    }

    /// Whether the error came from the connection rather than the switch rejecting the action
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::NotConnected | Self::ConnectionLost { .. } | Self::Closed
        )
    }
}
