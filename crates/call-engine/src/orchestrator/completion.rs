//! Completion notifier
//!
//! Every hangup after the queue drains pops an empty queue again, so the
//! "all targets exhausted" notice must be one-shot per drain cycle. The flag
//! re-arms when a real target is dispatched.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::notify::{Notification, Notifier};

/// Engine-wide dispatch flags
#[derive(Debug, Default)]
pub struct DispatchState {
    has_announced_queue_empty: AtomicBool,
}

impl DispatchState {
    pub fn has_announced_queue_empty(&self) -> bool {
        self.has_announced_queue_empty.load(Ordering::SeqCst)
    }
}

/// One-shot "queue exhausted" announcer
pub struct CompletionNotifier {
    state: DispatchState,
    notifier: Arc<dyn Notifier>,
}

impl CompletionNotifier {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            state: DispatchState::default(),
            notifier,
        }
    }

    pub fn state(&self) -> &DispatchState {
        &self.state
    }

    /// Notify unless this drain cycle was already announced. Returns whether a notice went out.
    pub async fn announce_if_first_empty(&self) -> bool {
        let first = self
            .state
            .has_announced_queue_empty
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();

        if first {
            self.notifier.notify(Notification::AllTargetsExhausted).await;
        } else {
            debug!("Queue still empty, already announced");
        }
        first
    }

    /// Re-arm after a real target was dispatched
    pub fn mark_dispatched(&self) {
        self.state
            .has_announced_queue_empty
            .store(false, Ordering::SeqCst);
    }
}
