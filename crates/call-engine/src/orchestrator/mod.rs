//! # Call Dispatch Orchestration Module
//!
//! Coordinates the target queue, the dial dispatcher and the call event
//! router. The engine keeps roughly `concurrent_calls` calls in flight without
//! any worker tasks: every hangup reported by the switch pops the next target
//! and dispatches it.
//!
//! ## Module Organization
//!
//! - **[`core`]**: [`CallEngine`] construction, batch start and operator queries
//! - **[`dispatch`]**: the pop-and-originate loop
//! - **[`events`]**: manager event classification and the event loop
//! - **[`completion`]**: the one-shot "all lines called" notice
//!
//! ## Call Flow
//!
//! ```text
//!  start_batch ──► queue ──► dispatch_next ──► Originate ──► switch
//!                    ▲                                         │
//!                    │                                         ▼
//!                    └──────────── Hangup ◄──── event loop ◄── events
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use autodial_call_engine::prelude::*;
//! use autodial_manager_client::{AmiClient, AmiConfig};
//!
//! # async fn example() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let (client, events) = AmiClient::connect(AmiConfig::default());
//! let engine = CallEngine::new(
//!     CallEngineConfig::new("03001234567").with_concurrent_calls(3),
//!     Arc::new(client),
//!     Arc::new(MemoryCallStore::new()),
//!     Arc::new(TracingNotifier),
//! )?;
//!
//! let event_loop = engine.spawn_event_loop(events);
//! engine
//!     .start_batch(vec![Target::from_number("15551234567")])
//!     .await?;
//! event_loop.await?;
//! # Ok(())
//! # }
//! ```

pub mod completion;
pub mod core;
pub mod dispatch;
pub mod events;

pub use completion::{CompletionNotifier, DispatchState};
pub use self::core::{BatchReport, CallEngine};
pub use events::CallEvent;
