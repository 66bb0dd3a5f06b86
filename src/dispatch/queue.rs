use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out request indices `0..total` exactly once each.
#[derive(Debug)]
pub struct WorkQueue {
    total: u64,
    next: AtomicU64,
}

impl WorkQueue {
    #[must_use]
    pub const fn new(total: u64) -> Self {
        Self {
            total,
            next: AtomicU64::new(0),
        }
    }

    /// Claims the next unclaimed index, or `None` once the queue is drained.
    pub fn next_index(&self) -> Option<u64> {
        loop {
            let current = self.next.load(Ordering::Relaxed);
            if current >= self.total {
                return None;
            }
            let next = current.checked_add(1)?;
            if self
                .next
                .compare_exchange(current, next, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
            {
                return Some(current);
            }
        }
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.total
            .saturating_sub(self.next.load(Ordering::Relaxed).min(self.total))
    }
}
