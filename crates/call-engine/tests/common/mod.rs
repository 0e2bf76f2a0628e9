//! Shared test doubles for the call-engine integration tests

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use autodial_call_engine::prelude::*;
use autodial_manager_client::{Action, ManagerClient, ManagerError, ManagerEvent, ManagerResponse};

/// Manager client that records every action and rejects originates to chosen numbers
#[derive(Default)]
pub struct MockManagerClient {
    actions: Mutex<Vec<Action>>,
    failing: Mutex<HashSet<String>>,
    connected: AtomicBool,
}

impl MockManagerClient {
    pub fn connected() -> Arc<Self> {
        let client = Self::default();
        client.connected.store(true, Ordering::SeqCst);
        Arc::new(client)
    }

    pub fn offline() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn fail_number(&self, number: &str) {
        self.failing.lock().insert(number.to_string());
    }

    pub fn actions(&self) -> Vec<Action> {
        self.actions.lock().clone()
    }

    /// `Exten` of every originate submitted so far, in order
    pub fn dialed(&self) -> Vec<String> {
        self.actions
            .lock()
            .iter()
            .filter_map(|a| a.header("Exten").map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl ManagerClient for MockManagerClient {
    async fn send_action(&self, action: Action) -> std::result::Result<ManagerResponse, ManagerError> {
        let exten = action.header("Exten").unwrap_or_default().to_string();
        let action_id = action.action_id().unwrap_or_default().to_string();
        self.actions.lock().push(action);

        if self.failing.lock().contains(&exten) {
            return Err(ManagerError::action_failed("Originate", "Originate failed"));
        }

        Ok(ManagerResponse::new(autodial_manager_client::Headers::from_pairs([
            ("Response", "Success"),
            ("ActionID", action_id.as_str()),
            ("Message", "Originate successfully queued"),
        ])))
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// Memory store that also counts insert attempts
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryCallStore,
    record_calls: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_calls(&self) -> usize {
        self.record_calls.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &MemoryCallStore {
        &self.inner
    }
}

#[async_trait]
impl CallStore for CountingStore {
    async fn has_been_dialed(&self, number: &str) -> Result<bool> {
        self.inner.has_been_dialed(number).await
    }

    async fn record_response(&self, target: &Target) -> Result<bool> {
        self.record_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.record_response(target).await
    }

    async fn claim_next(&self) -> Result<Option<StoredLine>> {
        self.inner.claim_next().await
    }

    async fn count_unclaimed(&self) -> Result<u64> {
        self.inner.count_unclaimed().await
    }
}

pub struct Harness {
    pub engine: Arc<CallEngine>,
    pub client: Arc<MockManagerClient>,
    pub store: Arc<CountingStore>,
    pub notifications: mpsc::UnboundedReceiver<Notification>,
}

impl Harness {
    pub fn new(concurrent_calls: usize) -> Self {
        Self::with_config(CallEngineConfig::new("03001234567").with_concurrent_calls(concurrent_calls))
    }

    pub fn with_config(config: CallEngineConfig) -> Self {
        let client = MockManagerClient::connected();
        let store = CountingStore::new();
        let (notifier, notifications) = ChannelNotifier::new();

        let engine = CallEngine::new(config, client.clone(), store.clone(), Arc::new(notifier))
            .expect("valid engine config");

        Self {
            engine,
            client,
            store,
            notifications,
        }
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        let mut seen = Vec::new();
        while let Ok(n) = self.notifications.try_recv() {
            seen.push(n);
        }
        seen
    }
}

pub fn targets(numbers: &[&str]) -> Vec<Target> {
    numbers.iter().map(|n| Target::from_number(*n)).collect()
}

pub fn hangup(number: &str) -> ManagerEvent {
    ManagerEvent::from_pairs([
        ("Event", "Hangup"),
        ("CallerIDNum", number),
        ("Cause", "16"),
        ("Cause-txt", "Normal Clearing"),
    ])
}

pub fn keypress(exten: &str, digit: &str) -> ManagerEvent {
    ManagerEvent::from_pairs([("Event", "DTMFBegin"), ("Exten", exten), ("Digit", digit)])
}

pub fn answered(channel: &str) -> ManagerEvent {
    ManagerEvent::from_pairs([
        ("Event", "Newstate"),
        ("Channel", channel),
        ("ChannelStateDesc", "Up"),
    ])
}
