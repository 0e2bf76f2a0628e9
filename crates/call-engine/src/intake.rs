//! Batch intake
//!
//! Turns an uploaded line list into dialable targets: one entry per line,
//! sanitized, deduplicated within the batch and filtered against numbers the
//! store already has on record.

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::database::CallStore;
use crate::error::Result;
use crate::types::Target;

/// Why a batch produced nothing to dial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchRejected {
    /// No line held a dialable number
    NothingToDial,
    /// Every dialable number is already on record
    AllProcessed,
}

impl fmt::Display for BatchRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingToDial => write!(f, "no valid phone numbers found"),
            Self::AllProcessed => write!(f, "all numbers have already been processed"),
        }
    }
}

/// Result of preparing a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparedBatch {
    pub targets: Vec<Target>,
    /// Non-blank lines without a dialable number, plus repeats within the batch
    pub skipped_lines: usize,
    /// Dialable numbers dropped because the store already has them
    pub already_dialed: usize,
}

impl PreparedBatch {
    pub fn rejection(&self) -> Option<BatchRejected> {
        if !self.targets.is_empty() {
            None
        } else if self.already_dialed > 0 {
            Some(BatchRejected::AllProcessed)
        } else {
            Some(BatchRejected::NothingToDial)
        }
    }
}

/// Sanitize every line, keeping the first occurrence of each number
pub fn parse_lines(text: &str) -> Vec<Target> {
    let mut seen = HashSet::new();
    text.lines()
        .filter_map(Target::from_line)
        .filter(|target| seen.insert(target.number.clone()))
        .collect()
}

/// Drop targets the store already has on record
pub async fn filter_undialed(store: &dyn CallStore, targets: Vec<Target>) -> Result<Vec<Target>> {
    let mut fresh = Vec::with_capacity(targets.len());
    for target in targets {
        if store.has_been_dialed(&target.number).await? {
            debug!("Skipping {}, already on record", target);
        } else {
            fresh.push(target);
        }
    }
    Ok(fresh)
}

/// Parse and filter an uploaded line list
pub async fn prepare_batch(store: &dyn CallStore, text: &str) -> Result<PreparedBatch> {
    let non_blank = text.lines().filter(|line| !line.trim().is_empty()).count();
    let parsed = parse_lines(text);
    let skipped_lines = non_blank - parsed.len();

    let parsed_len = parsed.len();
    let targets = filter_undialed(store, parsed).await?;

    Ok(PreparedBatch {
        already_dialed: parsed_len - targets.len(),
        skipped_lines,
        targets,
    })
}
