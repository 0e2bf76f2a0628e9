//! # Call Store
//!
//! Persistence seam for the engine. The dial loop only needs two things from
//! it: "was this number handled before" while a batch is filtered, and
//! "remember this qualifying response" when a keypress arrives. Operators use
//! the other two operations to count and claim the responses.
//!
//! Two implementations ship with the crate:
//!
//! - [`MemoryCallStore`]: process-local, used by tests and dry runs
//! - [`SqliteCallStore`]: a single sqlx-managed table

mod memory;
mod sqlite;

pub use memory::MemoryCallStore;
pub use sqlite::SqliteCallStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{StoredLine, Target};

/// Storage for qualifying responses
#[async_trait]
pub trait CallStore: Send + Sync {
    /// Whether the number is already on record; such numbers are not dialed again
    async fn has_been_dialed(&self, number: &str) -> Result<bool>;

    /// Record a qualifying response. Returns false when the number was already on record.
    async fn record_response(&self, target: &Target) -> Result<bool>;

    /// Mark the oldest unclaimed response as claimed and return it
    async fn claim_next(&self) -> Result<Option<StoredLine>>;

    /// Number of responses nobody has claimed yet
    async fn count_unclaimed(&self) -> Result<u64>;
}
