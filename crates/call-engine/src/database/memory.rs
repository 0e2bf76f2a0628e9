//! In-memory call store

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::CallStore;
use crate::error::Result;
use crate::types::{StoredLine, Target};

/// Process-local store keyed by number
#[derive(Debug, Clone, Default)]
pub struct MemoryCallStore {
    /// number -> (insertion sequence, line)
    lines: Arc<DashMap<String, (u64, StoredLine)>>,
    next_seq: Arc<AtomicU64>,
}

impl MemoryCallStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, number: &str) -> Option<StoredLine> {
        self.lines.get(number).map(|entry| entry.value().1.clone())
    }
}

#[async_trait]
impl CallStore for MemoryCallStore {
    async fn has_been_dialed(&self, number: &str) -> Result<bool> {
        Ok(self.lines.contains_key(number))
    }

    async fn record_response(&self, target: &Target) -> Result<bool> {
        match self.lines.entry(target.number.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                slot.insert((
                    seq,
                    StoredLine {
                        number: target.number.clone(),
                        raw_line: target.raw_line.clone(),
                        claimed: false,
                        recorded_at: Utc::now(),
                    },
                ));
                Ok(true)
            }
        }
    }

    async fn claim_next(&self) -> Result<Option<StoredLine>> {
        loop {
            let candidate = self
                .lines
                .iter()
                .filter(|entry| !entry.value().1.claimed)
                .min_by_key(|entry| entry.value().0)
                .map(|entry| entry.key().clone());

            let Some(number) = candidate else {
                return Ok(None);
            };

            // Another caller may have claimed it between the scan and here
            if let Some(mut entry) = self.lines.get_mut(&number) {
                if !entry.1.claimed {
                    entry.1.claimed = true;
                    return Ok(Some(entry.1.clone()));
                }
            }
        }
    }

    async fn count_unclaimed(&self) -> Result<u64> {
        Ok(self.lines.iter().filter(|entry| !entry.value().1.claimed).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_is_insert_if_absent() {
        let store = MemoryCallStore::new();
        let target = Target::from_number("15551234567");

        assert!(!store.has_been_dialed("15551234567").await.unwrap());
        assert!(store.record_response(&target).await.unwrap());
        assert!(!store.record_response(&target).await.unwrap());
        assert!(store.has_been_dialed("15551234567").await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_claims_oldest_first_and_counts() {
        let store = MemoryCallStore::new();
        for number in ["15550000001", "15550000002"] {
            store.record_response(&Target::from_number(number)).await.unwrap();
        }
        assert_eq!(store.count_unclaimed().await.unwrap(), 2);

        let first = store.claim_next().await.unwrap().expect("line available");
        assert_eq!(first.number, "15550000001");
        assert!(first.claimed);
        assert_eq!(store.count_unclaimed().await.unwrap(), 1);

        let second = store.claim_next().await.unwrap().expect("line available");
        assert_eq!(second.number, "15550000002");
        assert!(store.claim_next().await.unwrap().is_none());
        assert_eq!(store.count_unclaimed().await.unwrap(), 0);
    }
}
