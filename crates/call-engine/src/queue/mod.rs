//! # Target Queue
//!
//! FIFO of targets waiting for a free concurrency slot. The queue is shared
//! between the batch-start path and the event loop, so every pop takes the
//! lock: each target comes out exactly once no matter who pops.

mod recent;

pub use recent::RecentDispatches;

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::types::Target;

/// Ordered collection of not-yet-dialed targets
#[derive(Debug, Default)]
pub struct TargetQueue {
    targets: Mutex<VecDeque<Target>>,
}

impl TargetQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append targets to the tail in order. No dedup against dialed numbers.
    pub fn load_batch<I>(&self, targets: I) -> usize
    where
        I: IntoIterator<Item = Target>,
    {
        let mut queue = self.targets.lock();
        let before = queue.len();
        queue.extend(targets);
        queue.len() - before
    }

    /// Remove and return the head; `None` once drained, however often it is called
    pub fn pop_one(&self) -> Option<Target> {
        self.targets.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.targets.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.lock().is_empty()
    }

    /// Copy of the pending targets, head first
    pub fn snapshot(&self) -> Vec<Target> {
        self.targets.lock().iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn targets(n: usize) -> Vec<Target> {
        (0..n)
            .map(|i| Target::from_number(format!("1555000{:04}", i)))
            .collect()
    }

    #[test]
    fn test_fifo_order() {
        let queue = TargetQueue::new();
        assert_eq!(queue.load_batch(targets(3)), 3);
        queue.load_batch(vec![Target::from_number("15559999999")]);

        let popped: Vec<String> = std::iter::from_fn(|| queue.pop_one())
            .map(|t| t.number)
            .collect();
        assert_eq!(
            popped,
            vec!["15550000000", "15550000001", "15550000002", "15559999999"]
        );
    }

    #[test]
    fn test_empty_pop_is_repeatable() {
        let queue = TargetQueue::new();
        for _ in 0..5 {
            assert!(queue.pop_one().is_none());
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_concurrent_pops_deliver_each_target_once() {
        let queue = Arc::new(TargetQueue::new());
        queue.load_batch(targets(2_000));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let queue = queue.clone();
                std::thread::spawn(move || {
                    let mut seen = Vec::new();
                    while let Some(target) = queue.pop_one() {
                        seen.push(target.number);
                    }
                    seen
                })
            })
            .collect();

        let mut all = Vec::new();
        for handle in handles {
            all.extend(handle.join().expect("worker panicked"));
        }
        let unique: HashSet<_> = all.iter().cloned().collect();

        assert_eq!(all.len(), 2_000);
        assert_eq!(unique.len(), 2_000);
        assert!(queue.pop_one().is_none());
    }
}
