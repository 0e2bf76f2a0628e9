//! Bounded memory of recently dispatched targets
//!
//! Operators use it to see what was dialed last, and the event router uses
//! it to recover the raw line of a number that produced a keypress. It plays
//! no part in deduplication.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::types::Target;

#[derive(Debug)]
pub struct RecentDispatches {
    capacity: usize,
    entries: Mutex<VecDeque<Target>>,
}

impl RecentDispatches {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::new()),
        }
    }

    pub fn record(&self, target: Target) {
        let mut entries = self.entries.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(target);
    }

    /// Most recent dispatch of `number`, if still remembered
    pub fn find(&self, number: &str) -> Option<Target> {
        self.entries
            .lock()
            .iter()
            .rev()
            .find(|t| t.number == number)
            .cloned()
    }

    /// Newest first
    pub fn list(&self) -> Vec<Target> {
        self.entries.lock().iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest_past_capacity() {
        let recent = RecentDispatches::new(2);
        recent.record(Target::from_number("15550000001"));
        recent.record(Target::from_number("15550000002"));
        recent.record(Target::from_number("15550000003"));

        let numbers: Vec<_> = recent.list().into_iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec!["15550000003", "15550000002"]);
        assert!(recent.find("15550000001").is_none());
    }

    #[test]
    fn test_find_returns_latest_entry() {
        let recent = RecentDispatches::new(10);
        recent.record(Target {
            number: "15550000001".to_string(),
            raw_line: "first".to_string(),
        });
        recent.record(Target {
            number: "15550000001".to_string(),
            raw_line: "second".to_string(),
        });

        assert_eq!(recent.find("15550000001").map(|t| t.raw_line).as_deref(), Some("second"));
    }
}
