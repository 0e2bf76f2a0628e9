//! Operator notifications
//!
//! The engine reports batch progress through a [`Notifier`]. How the message
//! reaches a human (chat, email, log) is up to the implementation.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Something an operator should hear about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A batch was queued for dialing
    BatchLoaded { count: usize },
    /// Every queued target has been dispatched
    AllTargetsExhausted,
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BatchLoaded { count } => write!(f, "Calling {} phone numbers", count),
            Self::AllTargetsExhausted => write!(f, "All lines have been called"),
        }
    }
}

/// Sink for operator notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification);
}

/// Writes notifications to the log
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, notification: Notification) {
        info!(notification = ?notification, "{}", notification);
    }
}

/// Forwards notifications over a channel
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            warn!("Notification receiver dropped");
        }
    }
}
