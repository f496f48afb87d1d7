//! Sequential scan over a heap file.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::trace;

use crate::access::DbIterator;
use crate::buffer::BufferPool;
use crate::common::{Error, PageId, Permissions, Result, TransactionId};
use crate::storage::page::Record;
use crate::storage::HeapFile;

/// Page-at-a-time scan of every live record in a [`HeapFile`].
///
/// Pages are fetched through the buffer pool with `ReadOnly` permission, so
/// the scanning transaction ends up holding a shared lock on every page it
/// visited. Only one page's records are materialized at a time.
///
/// The number of pages is captured on `open` and `rewind`; pages appended
/// afterwards are not visited.
pub struct HeapScan<'a> {
    file: Arc<HeapFile>,
    pool: &'a BufferPool,
    tid: TransactionId,
    open: bool,
    page_count: u32,
    next_page: u32,
    buffered: VecDeque<Record>,
}

impl<'a> HeapScan<'a> {
    pub(crate) fn new(file: Arc<HeapFile>, pool: &'a BufferPool, tid: TransactionId) -> Self {
        Self {
            file,
            pool,
            tid,
            open: false,
            page_count: 0,
            next_page: 0,
            buffered: VecDeque::new(),
        }
    }

    pub fn transaction_id(&self) -> TransactionId {
        self.tid
    }

    fn restart(&mut self) -> Result<()> {
        self.page_count = self.file.page_count()?;
        self.next_page = 0;
        self.buffered.clear();
        Ok(())
    }

    /// Load pages until one has live records or the file is exhausted.
    fn fill(&mut self) -> Result<()> {
        while self.buffered.is_empty() && self.next_page < self.page_count {
            let pid = PageId::new(self.file.table_id(), self.next_page);
            let handle = self.pool.get_page(self.tid, pid, Permissions::ReadOnly)?;
            self.buffered.extend(handle.read().records());
            self.next_page += 1;

            trace!(tid = %self.tid, %pid, buffered = self.buffered.len(), "scan loaded page");
        }
        Ok(())
    }
}

impl DbIterator for HeapScan<'_> {
    fn open(&mut self) -> Result<()> {
        self.restart()?;
        self.open = true;
        Ok(())
    }

    fn has_next(&mut self) -> Result<bool> {
        if !self.open {
            return Err(Error::IteratorNotOpen);
        }
        self.fill()?;
        Ok(!self.buffered.is_empty())
    }

    fn next(&mut self) -> Result<Record> {
        if !self.has_next()? {
            return Err(Error::NoSuchElement);
        }
        self.buffered.pop_front().ok_or(Error::NoSuchElement)
    }

    fn rewind(&mut self) -> Result<()> {
        if !self.open {
            return Err(Error::IteratorNotOpen);
        }
        self.restart()
    }

    fn close(&mut self) {
        self.open = false;
        self.buffered.clear();
    }
}

impl std::fmt::Debug for HeapScan<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeapScan")
            .field("table_id", &self.file.table_id())
            .field("tid", &self.tid)
            .field("open", &self.open)
            .field("next_page", &self.next_page)
            .field("page_count", &self.page_count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::BufferPoolConfig;
    use crate::concurrency::LockMode;
    use crate::storage::page::SlotLayout;
    use crate::storage::Catalog;
    use tempfile::tempdir;

    /// Table with `pages` pages; page `n` holds `fill[n]` records tagged `n`.
    fn create_table(fill: &[usize]) -> (BufferPool, Arc<HeapFile>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let file =
            HeapFile::create(dir.path().join("t.dat"), SlotLayout::new(64, 8).unwrap()).unwrap();

        for (n, &count) in fill.iter().enumerate() {
            let pid = file.append_empty_page().unwrap();
            let mut page = file.read_page(pid).unwrap();
            for _ in 0..count {
                page.insert_record(&mut Record::new(vec![n as u8; 8])).unwrap();
            }
            file.write_page(&page).unwrap();
        }

        let file = Arc::new(file);
        let catalog = Arc::new(Catalog::new());
        catalog.add_table(Arc::clone(&file));
        let pool = BufferPool::new(BufferPoolConfig::default().with_capacity(8), catalog);
        (pool, file, dir)
    }

    #[test]
    fn test_scan_skips_empty_pages() {
        let (pool, file, _dir) = create_table(&[2, 0, 3]);
        let mut scan = file.scan(&pool, TransactionId::new(1));
        scan.open().unwrap();

        let tags: Vec<u8> = scan
            .collect_remaining()
            .unwrap()
            .iter()
            .map(|r| r.data()[0])
            .collect();
        assert_eq!(tags, vec![0, 0, 2, 2, 2]);
        assert!(matches!(scan.next(), Err(Error::NoSuchElement)));
    }

    #[test]
    fn test_scan_records_carry_location() {
        let (pool, file, _dir) = create_table(&[1]);
        let mut scan = file.scan(&pool, TransactionId::new(1));
        scan.open().unwrap();

        let rid = scan.next().unwrap().record_id().unwrap();
        assert_eq!(rid.page_id, PageId::new(file.table_id(), 0));
        assert_eq!(rid.slot, 0);
    }

    #[test]
    fn test_scan_takes_shared_locks() {
        let (pool, file, _dir) = create_table(&[1, 1]);
        let tid = TransactionId::new(1);
        let mut scan = file.scan(&pool, tid);
        scan.open().unwrap();
        scan.collect_remaining().unwrap();

        for n in 0..2 {
            let pid = PageId::new(file.table_id(), n);
            assert_eq!(pool.lock_manager().lock_mode(tid, pid), Some(LockMode::Shared));
        }
    }

    #[test]
    fn test_scan_rewind() {
        let (pool, file, _dir) = create_table(&[2]);
        let mut scan = file.scan(&pool, TransactionId::new(1));
        scan.open().unwrap();
        scan.collect_remaining().unwrap();

        scan.rewind().unwrap();
        assert_eq!(scan.collect_remaining().unwrap().len(), 2);
    }

    #[test]
    fn test_scan_not_open() {
        let (pool, file, _dir) = create_table(&[1]);
        let mut scan = file.scan(&pool, TransactionId::new(1));
        assert!(matches!(scan.has_next(), Err(Error::IteratorNotOpen)));

        scan.open().unwrap();
        scan.close();
        assert!(matches!(scan.next(), Err(Error::IteratorNotOpen)));
        assert!(matches!(scan.rewind(), Err(Error::IteratorNotOpen)));
    }

    #[test]
    fn test_scan_empty_file() {
        let (pool, file, _dir) = create_table(&[]);
        let mut scan = file.scan(&pool, TransactionId::new(1));
        scan.open().unwrap();
        assert!(!scan.has_next().unwrap());
    }
}
