//! # Outbound Call Dispatch Engine
//!
//! Dials a list of target numbers through an Asterisk switch with a bounded
//! number of calls in flight, and records every callee who presses `1`.
//!
//! ## Features
//!
//! - **Line sanitizing**: raw input lines become digit-only dialable numbers
//! - **Event-driven dial loop**: each hangup dispatches the next queued target
//! - **Keypress capture**: first `1` per extension is stored, repeats are ignored
//! - **One-shot completion notice** when the queue drains
//! - **Agent scripts**: the dialplan context is switchable at runtime
//! - **Pluggable storage**: in-memory or sqlite via sqlx
//!
//! ## Architecture
//!
//! ```text
//!  uploaded lines ──► intake ──► CallEngine ──► ManagerClient ──► switch
//!                                  │   ▲                           │
//!                       CallStore ◄┘   └──── ManagerEvent stream ◄─┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use autodial_call_engine::prelude::*;
//! use autodial_manager_client::{AmiClient, AmiConfig};
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let (client, events) = AmiClient::connect(
//!         AmiConfig::new("127.0.0.1", 5038).with_credentials("dialer", "secret"),
//!     );
//!     let store = Arc::new(SqliteCallStore::new("sqlite://autodial.db").await?);
//!
//!     let batch = intake::prepare_batch(store.as_ref(), "+1 555 123 4567\n").await?;
//!
//!     let engine = CallEngine::new(
//!         CallEngineConfig::new("03001234567"),
//!         Arc::new(client),
//!         store,
//!         Arc::new(TracingNotifier),
//!     )?;
//!     let router = engine.spawn_event_loop(events);
//!     engine.start_batch(batch.targets).await?;
//!     router.await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod intake;
pub mod notify;
pub mod sanitize;
pub mod types;

pub mod orchestrator;
pub mod queue;
pub mod routing;

pub mod database;

pub use config::CallEngineConfig;
pub use error::{CallEngineError, Result};
pub use orchestrator::{BatchReport, CallEngine, CallEvent};
pub use sanitize::sanitize;
pub use types::{DispatchOutcome, OriginateRequest, StoredLine, Target};

/// Commonly used types
pub mod prelude {
    pub use crate::{
        sanitize, BatchReport, CallEngine, CallEngineConfig, CallEngineError, CallEvent,
        DispatchOutcome, Result, StoredLine, Target,
    };

    pub use crate::database::{CallStore, MemoryCallStore, SqliteCallStore};
    pub use crate::intake::{self, BatchRejected, PreparedBatch};
    pub use crate::notify::{ChannelNotifier, Notification, Notifier, TracingNotifier};
}
