//! Configuration constants and buffer pool settings for heapdb.

use std::time::Duration;

/// Default size of a page in bytes (4KB).
///
/// Heap files may use a smaller page size through
/// [`SlotLayout::new`](crate::storage::page::SlotLayout::new); that is meant
/// for tests that want full pages without thousands of records.
pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// Default number of pages a buffer pool caches.
pub const DEFAULT_POOL_PAGES: usize = 50;

/// Default bound on how long a lock request waits before its transaction is
/// aborted.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(150);

/// Settings for a [`BufferPool`](crate::buffer::BufferPool).
///
/// # Example
/// ```
/// use heapdb::BufferPoolConfig;
/// use std::time::Duration;
///
/// let config = BufferPoolConfig::default()
///     .with_capacity(8)
///     .with_lock_timeout(Duration::from_millis(20));
/// assert_eq!(config.capacity, 8);
/// assert!(!config.deadlock_detection);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferPoolConfig {
    /// Maximum number of pages held in memory.
    pub capacity: usize,

    /// How long a blocked lock request waits before aborting.
    pub lock_timeout: Duration,

    /// Abort a blocked request as soon as it closes a wait-for cycle instead
    /// of waiting out the timeout.
    pub deadlock_detection: bool,
}

impl BufferPoolConfig {
    /// Set the page capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the lock wait bound.
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    /// Enable or disable wait-for cycle detection.
    pub fn with_deadlock_detection(mut self, enabled: bool) -> Self {
        self.deadlock_detection = enabled;
        self
    }
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_POOL_PAGES,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            deadlock_detection: false,
        }
    }
}
