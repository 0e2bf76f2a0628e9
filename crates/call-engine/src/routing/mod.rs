//! # Outbound Routing Module
//!
//! Decides where an originate goes: which trunk and feature code the channel
//! dials through, and which dialplan context (agent script) plays once the
//! callee answers.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │            Target            │
//! │  (number, raw line)          │
//! └──────────────┬───────────────┘
//!                │
//! ┌──────────────▼───────────────┐
//! │        ScriptRouter          │
//! │  - trunk / feature prefix    │
//! │  - caller identity           │
//! │  - selected agent script     │
//! └──────────────┬───────────────┘
//!                │
//! ┌──────────────▼───────────────┐
//! │       OriginateRequest       │
//! │  Channel, Context, Exten,    │
//! │  ActionID, CallerID, Async   │
//! └──────────────────────────────┘
//! ```
//!
//! ## Agent Scripts
//!
//! Operators pick one of the configured agent scripts at runtime. The choice
//! applies to every originate sent after it; calls already in flight keep the
//! context they were placed with.
//!
//! ```rust
//! use autodial_call_engine::{CallEngineConfig, Target, routing::ScriptRouter};
//!
//! let config = CallEngineConfig::new("03001234567")
//!     .with_agents(vec!["bilnet".to_string(), "survey".to_string()]);
//! let router = ScriptRouter::new(&config);
//!
//! router.set_agent("survey").unwrap();
//! let request = router.build_originate(&Target::from_number("15551234567"), "call-1".to_string());
//!
//! assert_eq!(request.channel, "SIP/main/*8088*03001234567*15551234567");
//! assert_eq!(request.context, "outbound-survey");
//! ```

use parking_lot::RwLock;
use tracing::info;

use crate::config::CallEngineConfig;
use crate::error::{CallEngineError, Result};
use crate::types::{OriginateRequest, Target};

/// Builds originate requests and owns the selected agent script
#[derive(Debug)]
pub struct ScriptRouter {
    trunk: String,
    feature_prefix: String,
    caller_id: String,
    context_prefix: String,
    agents: Vec<String>,
    current_agent: RwLock<String>,
}

impl ScriptRouter {
    pub fn new(config: &CallEngineConfig) -> Self {
        Self {
            trunk: config.trunk.clone(),
            feature_prefix: config.feature_prefix.clone(),
            caller_id: config.caller_id.clone(),
            context_prefix: config.context_prefix.clone(),
            agents: config.agents.clone(),
            current_agent: RwLock::new(config.default_agent().unwrap_or_default().to_string()),
        }
    }

    pub fn agents(&self) -> &[String] {
        &self.agents
    }

    pub fn current_agent(&self) -> String {
        self.current_agent.read().clone()
    }

    /// Select the agent script for subsequent originates
    pub fn set_agent(&self, name: &str) -> Result<()> {
        let Some(agent) = self.agents.iter().find(|a| a.eq_ignore_ascii_case(name)) else {
            return Err(CallEngineError::UnknownAgent {
                name: name.to_string(),
            });
        };
        *self.current_agent.write() = agent.clone();
        info!("Agent script changed to {}", agent);
        Ok(())
    }

    /// Dialplan context for the selected agent
    pub fn context(&self) -> String {
        format!("{}{}", self.context_prefix, self.current_agent.read())
    }

    /// `{feature_prefix}{caller_id}*{number}`
    pub fn dial_string(&self, number: &str) -> String {
        format!("{}{}*{}", self.feature_prefix, self.caller_id, number)
    }

    pub fn build_originate(&self, target: &Target, action_id: String) -> OriginateRequest {
        OriginateRequest {
            channel: format!("{}/{}", self.trunk, self.dial_string(&target.number)),
            context: self.context(),
            exten: target.number.clone(),
            priority: 1,
            action_id,
            // The switch presents the destination itself as caller id
            caller_id: target.number.clone(),
            is_async: true,
        }
    }
}
