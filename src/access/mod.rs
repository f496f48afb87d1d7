//! Record access paths.
//!
//! - [`DbIterator`] - the open/has_next/next/rewind/close cursor contract
//! - [`HeapScan`] - sequential scan of a heap file through the buffer pool
//! - [`RecordListIterator`] - cursor over records already in memory

mod db_iterator;
mod heap_scan;

pub use db_iterator::{DbIterator, RecordListIterator};
pub use heap_scan::HeapScan;
