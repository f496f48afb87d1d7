//! Victim selection for the buffer pool.
//!
//! - [`RecencyTracker`] - logical-clock least-recently-fetched selection,
//!   filtered by a caller-supplied evictability test

mod recency;

pub use recency::RecencyTracker;
