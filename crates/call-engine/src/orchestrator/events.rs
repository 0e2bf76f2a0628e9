//! Call event router
//!
//! Consumes manager events in delivery order on a single task. Only three
//! event kinds matter to the dial loop:
//!
//! | Event | Effect |
//! |---|---|
//! | `DTMFBegin`, digit `1` | first press per extension is recorded in the store |
//! | `Newstate`, state `Up` | logged |
//! | `Hangup` | the next target is dispatched |
//!
//! Everything else is ignored.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use autodial_manager_client::ManagerEvent;

use crate::types::Target;

use super::core::CallEngine;

/// Digit that counts as a positive response
pub const QUALIFYING_DIGIT: &str = "1";

/// Manager events the engine reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallEvent {
    DigitPressed { exten: String, digit: String },
    StateChanged { channel: String, state: String },
    Hangup {
        caller_id: String,
        cause: Option<String>,
        cause_text: Option<String>,
    },
    /// Any other event, by name
    Other(String),
}

impl CallEvent {
    pub fn from_manager_event(event: &ManagerEvent) -> Self {
        let field = |key: &str| event.get(key).unwrap_or_default().to_string();

        match event.name() {
            name if name.eq_ignore_ascii_case("DTMFBegin") => Self::DigitPressed {
                exten: field("exten"),
                digit: field("digit"),
            },
            name if name.eq_ignore_ascii_case("Newstate") => Self::StateChanged {
                channel: field("channel"),
                state: field("channelstatedesc"),
            },
            name if name.eq_ignore_ascii_case("Hangup") => Self::Hangup {
                caller_id: field("calleridnum"),
                cause: event.get("cause").map(str::to_string),
                cause_text: event.get("cause-txt").map(str::to_string),
            },
            name => Self::Other(name.to_string()),
        }
    }
}

impl CallEngine {
    /// Consume events until the channel closes
    pub async fn run_event_loop(self: Arc<Self>, mut events: mpsc::UnboundedReceiver<ManagerEvent>) {
        info!("Call event router started");
        while let Some(event) = events.recv().await {
            self.handle_event(&event).await;
        }
        info!("Manager event stream closed, call event router stopped");
    }

    pub async fn handle_event(&self, event: &ManagerEvent) {
        self.handle_call_event(CallEvent::from_manager_event(event)).await;
    }

    pub async fn handle_call_event(&self, event: CallEvent) {
        match event {
            CallEvent::DigitPressed { exten, digit } => {
                if digit == QUALIFYING_DIGIT {
                    self.on_qualifying_keypress(exten).await;
                } else {
                    debug!("Extension {} pressed {}", exten, digit);
                }
            }
            CallEvent::StateChanged { channel, state } => {
                if state.eq_ignore_ascii_case("Up") {
                    info!("Call answered on {}", channel);
                } else {
                    debug!("Channel {} is now {}", channel, state);
                }
            }
            CallEvent::Hangup {
                caller_id,
                cause,
                cause_text,
            } => {
                info!(
                    "Call to {} hung up: cause {} ({})",
                    caller_id,
                    cause.as_deref().unwrap_or("-"),
                    cause_text.as_deref().unwrap_or("unknown")
                );
                self.dispatch_next().await;
            }
            CallEvent::Other(name) => {
                debug!("Ignoring manager event {}", name);
            }
        }
    }

    async fn on_qualifying_keypress(&self, exten: String) {
        if !self.pressed.insert(exten.clone()) {
            info!("Extension {} already pressed 1", exten);
            return;
        }
        info!("Extension {} pressed 1", exten);

        let target = self
            .recent
            .find(&exten)
            .unwrap_or_else(|| Target::from_number(exten.as_str()));

        match self.store.record_response(&target).await {
            Ok(true) => debug!("Response from {} stored", target),
            Ok(false) => debug!("Response from {} was already on record", target),
            Err(e) => error!("Failed to store response from {}: {}", target, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_dtmf_begin() {
        let event = ManagerEvent::from_pairs([("Event", "DTMFBegin"), ("Exten", "1001"), ("Digit", "1")]);
        assert_eq!(
            CallEvent::from_manager_event(&event),
            CallEvent::DigitPressed {
                exten: "1001".to_string(),
                digit: "1".to_string()
            }
        );
    }

    #[test]
    fn test_classifies_hangup_with_cause() {
        let event = ManagerEvent::from_pairs([
            ("Event", "Hangup"),
            ("CallerIDNum", "15551234567"),
            ("Cause", "16"),
            ("Cause-txt", "Normal Clearing"),
        ]);
        assert_eq!(
            CallEvent::from_manager_event(&event),
            CallEvent::Hangup {
                caller_id: "15551234567".to_string(),
                cause: Some("16".to_string()),
                cause_text: Some("Normal Clearing".to_string()),
            }
        );
    }

    #[test]
    fn test_newstate_and_unknown_events() {
        let up = ManagerEvent::from_pairs([
            ("Event", "Newstate"),
            ("Channel", "SIP/main-0001"),
            ("ChannelStateDesc", "Up"),
        ]);
        assert!(matches!(
            CallEvent::from_manager_event(&up),
            CallEvent::StateChanged { state, .. } if state == "Up"
        ));

        let other = ManagerEvent::from_pairs([("Event", "PeerStatus")]);
        assert_eq!(
            CallEvent::from_manager_event(&other),
            CallEvent::Other("PeerStatus".to_string())
        );
    }
}
