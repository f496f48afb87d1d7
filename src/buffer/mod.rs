//! Buffer pool management.
//!
//! The buffer pool is the transactional page cache between record-level
//! operations and the heap files. It locks pages on behalf of transactions,
//! caches them up to a fixed capacity, and writes them back on commit.
//!
//! # Components
//! - [`BufferPool`] - The page cache and transaction completion logic
//! - [`PageHandle`] - Shared access to one cached page
//! - [`BufferPoolStats`] - Hit/miss/eviction counters
//! - [`replacer`] - Victim selection

mod buffer_pool;
mod page_handle;
pub mod replacer;
mod stats;

pub use buffer_pool::BufferPool;
pub use page_handle::PageHandle;
pub use stats::{BufferPoolStats, StatsSnapshot};
