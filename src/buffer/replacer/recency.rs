//! Logical-clock recency tracking for victim selection.
//!
//! Every successful fetch stamps the page with the next tick of a counter.
//! The victim is the page with the smallest stamp among those the caller
//! considers evictable (for the buffer pool: clean pages).

use std::collections::{BTreeMap, HashMap};

use crate::common::PageId;

/// Least-recently-fetched victim selection over page ids.
///
/// `stamps` maps page → last tick; `by_tick` orders the same entries by tick
/// so victim search walks pages oldest-first.
#[derive(Debug, Default)]
pub struct RecencyTracker {
    clock: u64,
    stamps: HashMap<PageId, u64>,
    by_tick: BTreeMap<u64, PageId>,
}

impl RecencyTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp `pid` with the next tick, returning it.
    pub fn record_access(&mut self, pid: PageId) -> u64 {
        self.clock += 1;
        if let Some(old) = self.stamps.insert(pid, self.clock) {
            self.by_tick.remove(&old);
        }
        self.by_tick.insert(self.clock, pid);
        self.clock
    }

    /// Forget `pid`.
    pub fn remove(&mut self, pid: PageId) {
        if let Some(tick) = self.stamps.remove(&pid) {
            self.by_tick.remove(&tick);
        }
    }

    /// The least recently fetched page for which `evictable` returns true.
    ///
    /// Does not remove the victim; the caller does that once eviction
    /// actually succeeds.
    pub fn victim<F>(&self, mut evictable: F) -> Option<PageId>
    where
        F: FnMut(PageId) -> bool,
    {
        self.by_tick
            .values()
            .copied()
            .find(|&pid| evictable(pid))
    }

    /// Last tick recorded for `pid`.
    pub fn stamp(&self, pid: PageId) -> Option<u64> {
        self.stamps.get(&pid).copied()
    }

    /// Number of tracked pages.
    pub fn size(&self) -> usize {
        self.stamps.len()
    }
}
