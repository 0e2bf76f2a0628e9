//! # Call Engine Configuration
//!
//! Settings that shape every originate the engine sends and how many calls it
//! keeps in flight.
//!
//! ```text
//! Channel:  {trunk}/{feature_prefix}{caller_id}*{number}   SIP/main/*8088*0333...*1555...
//! Context:  {context_prefix}{agent}                         outbound-bilnet
//! ```
//!
//! ## Example
//!
//! ```rust
//! use autodial_call_engine::CallEngineConfig;
//!
//! let config = CallEngineConfig::new("03001234567")
//!     .with_concurrent_calls(4)
//!     .with_agents(vec!["bilnet".to_string(), "survey".to_string()]);
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.default_agent(), Some("bilnet"));
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::error::{CallEngineError, Result};

/// Dial engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CallEngineConfig {
    /// Number of calls kept in flight while the queue is non-empty
    pub concurrent_calls: usize,

    /// Caller identity encoded into the dial string
    pub caller_id: String,

    /// Channel technology and trunk, e.g. `SIP/main`
    pub trunk: String,

    /// Feature code placed before the caller id in the dial string
    pub feature_prefix: String,

    /// Dialplan context prefix; the selected agent name is appended
    pub context_prefix: String,

    /// Agent scripts an operator may select; the first one is the default
    pub agents: Vec<String>,

    /// Poll interval while waiting for the manager connection
    pub connect_poll_interval_ms: u64,

    /// Give up waiting for the manager connection after this long; wait forever when unset
    pub connect_timeout_ms: Option<u64>,

    /// How many dispatched targets to remember for introspection
    pub recent_dispatch_capacity: usize,
}

impl Default for CallEngineConfig {
    fn default() -> Self {
        Self {
            concurrent_calls: 5,
            caller_id: String::new(),
            trunk: "SIP/main".to_string(),
            feature_prefix: "*8088*".to_string(),
            context_prefix: "outbound-".to_string(),
            agents: vec!["bilnet".to_string()],
            connect_poll_interval_ms: 1_000,
            connect_timeout_ms: None,
            recent_dispatch_capacity: 1_000,
        }
    }
}

impl CallEngineConfig {
    pub fn new(caller_id: impl Into<String>) -> Self {
        Self {
            caller_id: caller_id.into(),
            ..Default::default()
        }
    }

    pub fn with_concurrent_calls(mut self, concurrent_calls: usize) -> Self {
        self.concurrent_calls = concurrent_calls;
        self
    }

    pub fn with_agents(mut self, agents: Vec<String>) -> Self {
        self.agents = agents;
        self
    }

    pub fn with_trunk(mut self, trunk: impl Into<String>) -> Self {
        self.trunk = trunk.into();
        self
    }

    pub fn with_connect_poll_interval(mut self, interval: Duration) -> Self {
        self.connect_poll_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn connect_poll_interval(&self) -> Duration {
        Duration::from_millis(self.connect_poll_interval_ms.max(1))
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    pub fn default_agent(&self) -> Option<&str> {
        self.agents.first().map(|a| a.as_str())
    }

    /// Check the settings the dial loop cannot work without
    pub fn validate(&self) -> Result<()> {
        if self.concurrent_calls == 0 {
            return Err(CallEngineError::config("concurrent_calls must be at least 1"));
        }
        if self.caller_id.is_empty() || !self.caller_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(CallEngineError::config(format!(
                "caller_id must be a non-empty digit string, got '{}'",
                self.caller_id
            )));
        }
        if self.trunk.trim().is_empty() {
            return Err(CallEngineError::config("trunk must not be empty"));
        }
        if self.agents.is_empty() {
            return Err(CallEngineError::config("at least one agent script is required"));
        }
        if let Some(agent) = self.agents.iter().find(|a| a.trim().is_empty()) {
            return Err(CallEngineError::config(format!("invalid agent name '{}'", agent)));
        }
        Ok(())
    }
}
