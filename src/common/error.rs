//! Error types for heapdb.

use thiserror::Error;

use super::{PageId, TableId, TransactionId};

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors surfaced by the storage engine.
///
/// Nothing is retried internally; every error reaches the immediate caller.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O failure reading or writing a heap file.
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Page is out of range or belongs to a different table.
    #[error("invalid page: {0}")]
    InvalidPage(PageId),

    /// Record has no location, points outside its table, or its slot is free.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Record payload does not match the table's fixed record width.
    #[error("record size mismatch: expected {expected} bytes, got {actual}")]
    RecordSizeMismatch { expected: usize, actual: usize },

    /// Page size and record size leave no room for a single slot.
    #[error("invalid slot layout: page size {page_size}, record size {record_size}")]
    InvalidLayout { page_size: usize, record_size: usize },

    /// No heap file is registered under this table id.
    #[error("table {0} not found")]
    TableNotFound(TableId),

    /// A lock request timed out or closed a wait-for cycle.
    ///
    /// The transaction must abort; it may be retried from scratch.
    #[error("transaction {0} aborted")]
    TransactionAborted(TransactionId),

    /// The cache is full and every cached page is dirty.
    #[error("cannot evict: all {capacity} cached pages are dirty")]
    EvictionExhausted { capacity: usize },

    /// Insert into a page with no free slot.
    #[error("{0} has no free slot")]
    PageFull(PageId),

    /// `next()` called on an exhausted iterator.
    #[error("no more elements")]
    NoSuchElement,

    /// Iterator used before `open()` or after `close()`.
    #[error("iterator is not open")]
    IteratorNotOpen,
}

impl Error {
    /// Whether this error means the caller's transaction was chosen to abort.
    pub fn is_transaction_aborted(&self) -> bool {
        matches!(self, Error::TransactionAborted(_))
    }
}
