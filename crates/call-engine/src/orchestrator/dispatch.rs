//! Dial dispatcher
//!
//! Pops targets and submits originates until one is accepted or the queue is
//! empty. A target whose originate is rejected is dropped, not re-queued.

use std::sync::atomic::Ordering;

use chrono::Utc;
use tracing::{info, warn};

use crate::types::{DispatchOutcome, Target};

use super::core::CallEngine;

impl CallEngine {
    /// Fill one concurrency slot.
    ///
    /// Returns [`DispatchOutcome::QueueExhausted`] when no target could be
    /// dispatched; the first such result in a drain cycle notifies the operator.
    pub async fn dispatch_next(&self) -> DispatchOutcome {
        loop {
            let Some(target) = self.queue.pop_one() else {
                self.completion.announce_if_first_empty().await;
                return DispatchOutcome::QueueExhausted;
            };

            self.completion.mark_dispatched();

            let action_id = self.next_action_id(&target);
            let request = self.router.build_originate(&target, action_id.clone());
            self.recent.record(target.clone());

            info!("Ringing number {} via {}", target, request.context);

            match self.client.send_action(request.into_action()).await {
                Ok(_) => {
                    return DispatchOutcome::Dispatched { target, action_id };
                }
                Err(e) if e.is_connection_error() => {
                    warn!("Manager link down, skipping {}: {}", target, e);
                }
                Err(e) => {
                    warn!("Originate for {} rejected, skipping: {}", target, e);
                }
            }
        }
    }

    /// `call-{number}-{millis}-{seq}`, unique even for repeated dials in the same millisecond
    fn next_action_id(&self, target: &Target) -> String {
        let seq = self.dispatch_seq.fetch_add(1, Ordering::Relaxed);
        format!("call-{}-{}-{}", target.number, Utc::now().timestamp_millis(), seq)
    }
}
