//! Transaction identifier type.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TRANSACTION_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque token naming a transaction.
///
/// Valid from creation until the transaction commits or aborts. Ids handed
/// out by [`TransactionId::next`] are never reused within a process.
///
/// # Example
/// ```
/// use heapdb::TransactionId;
///
/// let a = TransactionId::next();
/// let b = TransactionId::next();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(u64);

impl TransactionId {
    /// Wrap an externally issued id.
    #[inline]
    pub fn new(raw: u64) -> Self {
        TransactionId(raw)
    }

    /// Issue a fresh id from the process-wide counter.
    pub fn next() -> Self {
        TransactionId(NEXT_TRANSACTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric value.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Txn({})", self.0)
    }
}
