//! Shared call engine types

use std::fmt;

use serde::{Deserialize, Serialize};

use autodial_manager_client::Action;

use crate::sanitize::sanitize;

/// One sanitized destination waiting to be dialed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    /// Digit-only dialable number
    pub number: String,
    /// The input line the number came from
    pub raw_line: String,
}

impl Target {
    /// Sanitize a raw line into a target
    pub fn from_line(line: &str) -> Option<Self> {
        let raw_line = line.trim();
        sanitize(raw_line).map(|number| Self {
            number,
            raw_line: raw_line.to_string(),
        })
    }

    /// Target with no separate raw line
    pub fn from_number(number: impl Into<String>) -> Self {
        let number = number.into();
        Self {
            raw_line: number.clone(),
            number,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{}", self.number)
    }
}

/// Outbound originate, built per dispatch and dropped after submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginateRequest {
    pub channel: String,
    pub context: String,
    pub exten: String,
    pub priority: u32,
    pub action_id: String,
    pub caller_id: String,
    pub is_async: bool,
}

impl OriginateRequest {
    pub fn into_action(self) -> Action {
        Action::from(self)
    }
}

impl From<OriginateRequest> for Action {
    fn from(request: OriginateRequest) -> Self {
        Action::new("Originate")
            .with_header("Channel", request.channel)
            .with_header("Context", request.context)
            .with_header("Exten", request.exten)
            .with_header("Priority", request.priority)
            .with_header("ActionID", request.action_id)
            .with_header("CallerID", request.caller_id)
            .with_header("Async", request.is_async)
    }
}

/// What a call to the dispatcher ended with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// An originate was accepted by the switch
    Dispatched { target: Target, action_id: String },
    /// The queue was empty, possibly after skipping failed targets
    QueueExhausted,
}

impl DispatchOutcome {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, Self::Dispatched { .. })
    }
}

/// Response line kept by the call store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredLine {
    pub number: String,
    pub raw_line: String,
    pub claimed: bool,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}
