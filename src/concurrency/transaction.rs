//! RAII transaction handle.

use tracing::warn;

use crate::access::HeapScan;
use crate::buffer::{BufferPool, PageHandle};
use crate::common::{PageId, Permissions, Result, TableId, TransactionId};
use crate::storage::page::Record;

/// A transaction running against a [`BufferPool`].
///
/// Completing the transaction consumes the handle, so its id cannot be used
/// through it afterwards. A handle dropped without [`commit`](Self::commit)
/// or [`abort`](Self::abort) is aborted.
///
/// # Example
/// ```ignore
/// let txn = pool.begin();
/// let mut record = Record::new(vec![0u8; 8]);
/// txn.insert_record(table_id, &mut record)?;
/// txn.commit()?;
/// ```
pub struct Transaction<'a> {
    pool: &'a BufferPool,
    tid: TransactionId,
    completed: bool,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(pool: &'a BufferPool, tid: TransactionId) -> Self {
        Self {
            pool,
            tid,
            completed: false,
        }
    }

    #[inline]
    pub fn id(&self) -> TransactionId {
        self.tid
    }

    /// See [`BufferPool::get_page`].
    pub fn get_page(&self, pid: PageId, perm: Permissions) -> Result<PageHandle> {
        self.pool.get_page(self.tid, pid, perm)
    }

    /// See [`BufferPool::insert_record`].
    pub fn insert_record(&self, table_id: TableId, record: &mut Record) -> Result<Vec<PageHandle>> {
        self.pool.insert_record(self.tid, table_id, record)
    }

    /// See [`BufferPool::delete_record`].
    pub fn delete_record(&self, record: &Record) -> Result<Vec<PageHandle>> {
        self.pool.delete_record(self.tid, record)
    }

    /// Scan every live record of `table_id` under shared locks.
    ///
    /// # Errors
    /// `Error::TableNotFound` if the table is not in the catalog.
    pub fn scan(&self, table_id: TableId) -> Result<HeapScan<'a>> {
        let file = self.pool.catalog().heap_file(table_id)?;
        Ok(file.scan(self.pool, self.tid))
    }

    /// Flush this transaction's dirty pages and release its locks.
    ///
    /// # Errors
    /// On a failed write-back the transaction is aborted instead and the
    /// error returned.
    pub fn commit(mut self) -> Result<()> {
        self.completed = true;
        let result = self.pool.commit(self.tid);
        if result.is_err() {
            self.pool.abort(self.tid);
        }
        result
    }

    /// Discard this transaction's pages and release its locks.
    pub fn abort(mut self) {
        self.completed = true;
        self.pool.abort(self.tid);
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.completed {
            warn!(tid = %self.tid, "transaction dropped without completing, aborting");
            self.pool.abort(self.tid);
        }
    }
}

impl std::fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("tid", &self.tid)
            .field("completed", &self.completed)
            .finish()
    }
}
