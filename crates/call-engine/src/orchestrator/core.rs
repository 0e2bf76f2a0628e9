//! Core call engine
//!
//! [`CallEngine`] owns every piece of dial-loop state: the target queue, the
//! keypress dedup set, the completion flag and the recent-dispatch memory.
//! Nothing is global, so several engines can run side by side in one process
//! (the tests do exactly that).

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use dashmap::DashSet;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use autodial_manager_client::{ManagerClient, ManagerEvent};

use crate::config::CallEngineConfig;
use crate::database::CallStore;
use crate::error::{CallEngineError, Result};
use crate::notify::{Notification, Notifier};
use crate::queue::{RecentDispatches, TargetQueue};
use crate::routing::ScriptRouter;
use crate::types::{StoredLine, Target};

use super::completion::CompletionNotifier;

/// Summary of a batch start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    /// Targets appended to the queue
    pub queued: usize,
    /// Originates accepted while filling the concurrency slots
    pub dispatched: usize,
}

/// Outbound call dispatch engine
pub struct CallEngine {
    pub(super) config: CallEngineConfig,
    pub(super) client: Arc<dyn ManagerClient>,
    pub(super) store: Arc<dyn CallStore>,
    pub(super) notifier: Arc<dyn Notifier>,
    pub(super) queue: TargetQueue,
    pub(super) recent: RecentDispatches,
    pub(super) router: ScriptRouter,
    pub(super) completion: CompletionNotifier,
    /// Extensions that already produced a qualifying keypress; never pruned
    pub(super) pressed: DashSet<String>,
    pub(super) dispatch_seq: AtomicU64,
}

impl CallEngine {
    /// Create an engine after validating its configuration
    pub fn new(
        config: CallEngineConfig,
        client: Arc<dyn ManagerClient>,
        store: Arc<dyn CallStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Arc<Self>> {
        config.validate()?;

        info!(
            "Call engine configured: {} concurrent calls via {}, agents {:?}",
            config.concurrent_calls, config.trunk, config.agents
        );

        Ok(Arc::new(Self {
            queue: TargetQueue::new(),
            recent: RecentDispatches::new(config.recent_dispatch_capacity),
            router: ScriptRouter::new(&config),
            completion: CompletionNotifier::new(notifier.clone()),
            pressed: DashSet::new(),
            dispatch_seq: AtomicU64::new(0),
            config,
            client,
            store,
            notifier,
        }))
    }

    pub fn config(&self) -> &CallEngineConfig {
        &self.config
    }

    /// Spawn the event router on its own task
    pub fn spawn_event_loop(self: &Arc<Self>, events: mpsc::UnboundedReceiver<ManagerEvent>) -> JoinHandle<()> {
        let engine = self.clone();
        tokio::spawn(engine.run_event_loop(events))
    }

    /// Poll the manager client until it reports a live session.
    ///
    /// Waits forever unless `connect_timeout_ms` is configured.
    pub async fn wait_for_connection(&self) -> Result<()> {
        if self.client.is_connected() {
            return Ok(());
        }
        info!("Waiting for manager connection");

        let poll = self.config.connect_poll_interval();
        let wait = async {
            let mut interval = tokio::time::interval(poll);
            loop {
                interval.tick().await;
                if self.client.is_connected() {
                    break;
                }
            }
        };

        match self.config.connect_timeout() {
            Some(limit) => tokio::time::timeout(limit, wait)
                .await
                .map_err(|_| CallEngineError::ConnectTimeout {
                    seconds: limit.as_secs(),
                }),
            None => {
                wait.await;
                Ok(())
            }
        }
    }

    /// Append targets to the queue without dispatching anything
    pub fn load_batch(&self, targets: Vec<Target>) -> usize {
        let queued = self.queue.load_batch(targets);
        debug!("Queued {} targets, {} pending", queued, self.queue.len());
        queued
    }

    /// Queue a batch and fill the concurrency slots.
    ///
    /// Waits for the manager connection first. After this returns, the queue
    /// advances only through hangup events.
    pub async fn start_batch(&self, targets: Vec<Target>) -> Result<BatchReport> {
        self.wait_for_connection().await?;

        let queued = self.load_batch(targets);
        self.notifier
            .notify(Notification::BatchLoaded { count: queued })
            .await;

        let mut dispatched = 0;
        for _ in 0..self.config.concurrent_calls {
            if self.dispatch_next().await.is_dispatched() {
                dispatched += 1;
            }
        }

        info!(
            "Batch started: {} queued, {} calls in flight, {} waiting",
            queued,
            dispatched,
            self.queue.len()
        );
        Ok(BatchReport { queued, dispatched })
    }

    /// Targets still waiting for a slot
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn pending_targets(&self) -> Vec<Target> {
        self.queue.snapshot()
    }

    /// Recently dispatched targets, newest first
    pub fn recent_dispatches(&self) -> Vec<Target> {
        self.recent.list()
    }

    /// Extensions that registered a qualifying keypress so far
    pub fn pressed_count(&self) -> usize {
        self.pressed.len()
    }

    pub fn has_announced_queue_empty(&self) -> bool {
        self.completion.state().has_announced_queue_empty()
    }

    pub fn agents(&self) -> &[String] {
        self.router.agents()
    }

    pub fn current_agent(&self) -> String {
        self.router.current_agent()
    }

    /// Switch the agent script used by subsequent originates
    pub fn set_agent(&self, name: &str) -> Result<()> {
        self.router.set_agent(name)
    }

    /// Responses on record that no operator has claimed yet
    pub async fn count_remaining_lines(&self) -> Result<u64> {
        self.store.count_unclaimed().await
    }

    /// Hand the oldest unclaimed response to an operator
    pub async fn claim_line(&self) -> Result<Option<StoredLine>> {
        let line = self.store.claim_next().await?;
        match &line {
            Some(line) => info!("Line {} claimed", line.number),
            None => info!("No lines left to claim"),
        }
        Ok(line)
    }
}
