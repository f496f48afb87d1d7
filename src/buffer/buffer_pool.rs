//! Buffer Pool - the page cache in front of every heap file.
//!
//! The [`BufferPool`] provides:
//! - Page-level locking (through the [`LockManager`]) before every fetch
//! - Bounded caching of pages loaded from the catalog's heap files
//! - Least-recently-fetched eviction restricted to clean pages
//! - Transaction completion: flush-and-release on commit, discard-and-release
//!   on abort

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::buffer::replacer::RecencyTracker;
use crate::buffer::{BufferPoolStats, PageHandle};
use crate::common::{BufferPoolConfig, Error, PageId, Permissions, Result, TableId, TransactionId};
use crate::concurrency::{LockManager, LockMode, Transaction};
use crate::storage::page::Record;
use crate::storage::Catalog;

/// Cache state guarded by a single mutex.
#[derive(Debug, Default)]
struct CacheInner {
    pages: HashMap<PageId, PageHandle>,
    recency: RecencyTracker,
}

/// Transactional page cache over the tables of a [`Catalog`].
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────────────────────┐
/// │                         BufferPool                           │
/// │  ┌──────────────┐   ┌─────────────────────────────────────┐  │
/// │  │ lock_manager │   │      cache: Mutex<CacheInner>       │  │
/// │  │ S/X per page │   │  pages: PageId → PageHandle         │  │
/// │  └──────────────┘   │  recency: RecencyTracker            │  │
/// │                     └─────────────────────────────────────┘  │
/// │  ┌──────────────┐   ┌──────────────┐                         │
/// │  │   catalog    │   │    stats     │                         │
/// │  │ TableId → HF │   │   atomics    │                         │
/// │  └──────────────┘   └──────────────┘                         │
/// └──────────────────────────────────────────────────────────────┘
/// ```
///
/// # Thread Safety
/// - `lock_manager`: its own mutex and condvar; lock waits never hold `cache`
/// - `cache`: one `Mutex`, held across check-capacity, evict, load, insert
/// - page contents: a `RwLock` per page inside each [`PageHandle`]
/// - `stats`: atomic counters
///
/// Eviction only ever `try_read`s a page, and flushes take page locks after
/// `cache` has been released, so `cache` is never held while waiting on a
/// page.
///
/// # Working Set
/// Eviction does not look at the lock table. A clean page a live transaction
/// holds can be evicted, and every [`PageHandle`] taken before that is
/// detached: it still works, but the pool no longer knows about it, so a write
/// made through it is never flushed and `commit` still succeeds. Capacity
/// must therefore exceed the number of distinct pages any single transaction
/// fetches, not only the pages it dirties.
///
/// Record operations ([`insert_record`](Self::insert_record),
/// [`delete_record`](Self::delete_record)) are not exposed to this: they
/// write right after fetching and then [`readmit`](Self::readmit) the page,
/// so a page evicted in that window is put back before its write is lost.
/// Writes made through a handle kept across other fetches are still exposed.
///
/// # Usage
/// ```ignore
/// let pool = BufferPool::new(BufferPoolConfig::default(), catalog);
/// let txn = pool.begin();
/// txn.insert_record(table_id, &mut Record::new(payload))?;
/// txn.commit()?;
/// ```
pub struct BufferPool {
    config: BufferPoolConfig,
    catalog: Arc<Catalog>,
    lock_manager: LockManager,
    cache: Mutex<CacheInner>,
    stats: BufferPoolStats,
}

impl BufferPool {
    /// Create a buffer pool over `catalog`.
    ///
    /// # Panics
    /// Panics if `config.capacity` is 0.
    pub fn new(config: BufferPoolConfig, catalog: Arc<Catalog>) -> Self {
        assert!(config.capacity > 0, "buffer pool capacity must be > 0");

        Self {
            lock_manager: LockManager::new(config.lock_timeout, config.deadlock_detection),
            config,
            catalog,
            cache: Mutex::new(CacheInner::default()),
            stats: BufferPoolStats::new(),
        }
    }

    /// Start a transaction with a fresh id.
    pub fn begin(&self) -> Transaction<'_> {
        Transaction::new(self, TransactionId::next())
    }

    // ========================================================================
    // Public API: Fetch pages
    // ========================================================================

    /// Fetch a page on behalf of `tid`.
    ///
    /// The page lock is acquired first: shared for `ReadOnly`, exclusive for
    /// `ReadWrite`. This may block for up to the configured lock timeout.
    /// A cached page is returned as is; otherwise the page is loaded from its
    /// heap file, evicting a clean page first if the cache is full.
    ///
    /// # Errors
    /// - `Error::TransactionAborted` if the lock cannot be granted
    /// - `Error::TableNotFound` if the catalog has no such table
    /// - `Error::InvalidPage` if the page does not exist in its heap file
    /// - `Error::EvictionExhausted` if the cache is full of dirty pages
    /// - `Error::Storage` on I/O failure
    pub fn get_page(&self, tid: TransactionId, pid: PageId, perm: Permissions) -> Result<PageHandle> {
        let mode = match perm {
            Permissions::ReadOnly => LockMode::Shared,
            Permissions::ReadWrite => LockMode::Exclusive,
        };
        self.lock_manager.acquire(tid, pid, mode)?;

        let mut cache = self.cache.lock();

        if let Some(handle) = cache.pages.get(&pid).cloned() {
            cache.recency.record_access(pid);
            self.stats.record_hit();
            trace!(%tid, %pid, "cache hit");
            return Ok(handle);
        }

        while cache.pages.len() >= self.config.capacity {
            self.evict_locked(&mut cache)?;
        }

        let page = self.catalog.heap_file(pid.table_id)?.read_page(pid)?;
        let handle = PageHandle::new(page);
        cache.pages.insert(pid, handle.clone());
        cache.recency.record_access(pid);
        self.stats.record_miss();

        debug!(%tid, %pid, cached = cache.pages.len(), "cache miss, page loaded");
        Ok(handle)
    }

    // ========================================================================
    // Public API: Discard and evict
    // ========================================================================

    /// Drop a page from the cache without writing it back.
    ///
    /// Used on abort to throw away uncommitted changes. Does nothing if the
    /// page is not cached.
    pub fn discard_page(&self, pid: PageId) {
        let mut cache = self.cache.lock();
        if cache.pages.remove(&pid).is_some() {
            cache.recency.remove(pid);
            self.stats.record_discard();
            trace!(%pid, "discarded page");
        }
    }

    /// Evict one clean page.
    ///
    /// The victim is the least recently fetched page that is not dirty.
    /// Dirty pages (and pages someone is writing right now) are never
    /// evicted. Locks are not consulted: handles to the victim held by a
    /// transaction are detached, and later writes through them are lost.
    ///
    /// # Errors
    /// - `Error::EvictionExhausted` if no cached page is clean
    pub fn evict_page(&self) -> Result<()> {
        let mut cache = self.cache.lock();
        self.evict_locked(&mut cache)
    }

    fn evict_locked(&self, cache: &mut CacheInner) -> Result<()> {
        let CacheInner { pages, recency } = cache;

        let victim = recency.victim(|pid| {
            pages
                .get(&pid)
                .and_then(|handle| handle.try_read())
                .is_some_and(|page| !page.is_dirty())
        });

        let Some(pid) = victim else {
            warn!(capacity = self.config.capacity, "no clean page to evict");
            return Err(Error::EvictionExhausted {
                capacity: self.config.capacity,
            });
        };

        // Clean victims need no write-back.
        pages.remove(&pid);
        recency.remove(pid);
        self.stats.record_eviction();

        debug!(%pid, "evicted page");
        Ok(())
    }

    /// Put a page a record operation just dirtied back into the cache.
    ///
    /// Called with the page's write guard held, after `mark_dirty`. Between
    /// `get_page` and taking that guard the page was clean and unguarded, so
    /// another caller's miss may have evicted it. The writer holds the
    /// exclusive lock, so nobody can have reloaded `pid` since.
    ///
    /// # Errors
    /// - `Error::EvictionExhausted` if the cache is full of dirty pages
    pub(crate) fn readmit(&self, handle: &PageHandle) -> Result<()> {
        let pid = handle.page_id();
        let mut cache = self.cache.lock();

        if cache.pages.contains_key(&pid) {
            return Ok(());
        }

        while cache.pages.len() >= self.config.capacity {
            self.evict_locked(&mut cache)?;
        }

        cache.pages.insert(pid, handle.clone());
        cache.recency.record_access(pid);

        debug!(%pid, "readmitted page evicted before its write");
        Ok(())
    }

    // ========================================================================
    // Public API: Flush pages
    // ========================================================================

    /// Write a cached page back to its heap file if it is dirty.
    ///
    /// No lock is checked; the page stays cached.
    ///
    /// # Errors
    /// - `Error::TableNotFound` or `Error::Storage` from the write-back
    pub fn flush_page(&self, pid: PageId) -> Result<()> {
        let handle = self.cache.lock().pages.get(&pid).cloned();
        match handle {
            Some(handle) => self.flush_handle(&handle),
            None => Ok(()),
        }
    }

    /// Write every dirty cached page back.
    ///
    /// # Errors
    /// Stops at the first failed write-back.
    pub fn flush_all_pages(&self) -> Result<()> {
        let handles: Vec<PageHandle> = self.cache.lock().pages.values().cloned().collect();

        for handle in &handles {
            self.flush_handle(handle)?;
        }

        Ok(())
    }

    /// Write back every dirty cached page that `tid` holds a lock on.
    ///
    /// # Errors
    /// Stops at the first failed write-back.
    pub fn flush_pages(&self, tid: TransactionId) -> Result<()> {
        let held = self.lock_manager.pages_held(tid);
        let handles: Vec<PageHandle> = {
            let cache = self.cache.lock();
            held.iter()
                .filter_map(|pid| cache.pages.get(pid).cloned())
                .collect()
        };

        for handle in &handles {
            self.flush_handle(handle)?;
        }

        Ok(())
    }

    fn flush_handle(&self, handle: &PageHandle) -> Result<()> {
        let mut page = handle.write();

        if page.is_dirty() {
            let pid = page.id();
            self.catalog.heap_file(pid.table_id)?.write_page(&page)?;
            page.clear_dirty();
            self.stats.record_write();
            debug!(%pid, "flushed page");
        }

        Ok(())
    }

    // ========================================================================
    // Public API: Transaction completion
    // ========================================================================

    /// Make `tid`'s changes durable and release its locks.
    ///
    /// # Errors
    /// If a write-back fails the error is returned and every lock is still
    /// held; the caller should then [`abort`](Self::abort).
    pub fn commit(&self, tid: TransactionId) -> Result<()> {
        self.flush_pages(tid)?;
        self.lock_manager.release_all(tid);

        debug!(%tid, "committed");
        Ok(())
    }

    /// Throw away `tid`'s changes and release its locks.
    ///
    /// Every page `tid` holds is dropped from the cache, so the next fetch
    /// sees the on-disk image.
    pub fn abort(&self, tid: TransactionId) {
        let held = self.lock_manager.pages_held(tid);
        for &pid in &held {
            self.discard_page(pid);
        }
        self.lock_manager.release_all(tid);

        debug!(%tid, discarded = held.len(), "aborted");
    }

    /// Commit or abort `tid`.
    pub fn transaction_complete(&self, tid: TransactionId, commit: bool) -> Result<()> {
        if commit {
            self.commit(tid)
        } else {
            self.abort(tid);
            Ok(())
        }
    }

    // ========================================================================
    // Public API: Locks
    // ========================================================================

    /// Release `tid`'s lock on a single page before the transaction ends.
    ///
    /// This breaks two-phase locking; callers use it only for pages they
    /// only inspected (see [`HeapFile::insert_record`](crate::storage::HeapFile::insert_record)).
    pub fn release_page(&self, tid: TransactionId, pid: PageId) {
        self.lock_manager.release(tid, pid);
    }

    /// Whether `tid` holds a shared or exclusive lock on `pid`.
    pub fn holds_lock(&self, tid: TransactionId, pid: PageId) -> bool {
        self.lock_manager.holds(tid, pid)
    }

    // ========================================================================
    // Public API: Records
    // ========================================================================

    /// Insert `record` into table `table_id` on behalf of `tid`.
    ///
    /// Returns the pages that were dirtied.
    ///
    /// # Errors
    /// - `Error::TableNotFound` if the table is not in the catalog
    /// - any error from [`HeapFile::insert_record`](crate::storage::HeapFile::insert_record)
    pub fn insert_record(
        &self,
        tid: TransactionId,
        table_id: TableId,
        record: &mut Record,
    ) -> Result<Vec<PageHandle>> {
        self.catalog.heap_file(table_id)?.insert_record(self, tid, record)
    }

    /// Delete `record` from the table its record id points into.
    ///
    /// # Errors
    /// - `Error::InvalidRecord` if the record has never been stored
    /// - `Error::TableNotFound` if the table is not in the catalog
    /// - any error from [`HeapFile::delete_record`](crate::storage::HeapFile::delete_record)
    pub fn delete_record(&self, tid: TransactionId, record: &Record) -> Result<Vec<PageHandle>> {
        let rid = record
            .record_id()
            .ok_or_else(|| Error::InvalidRecord("record has no location".to_string()))?;

        self.catalog
            .heap_file(rid.page_id.table_id)?
            .delete_record(self, tid, record)
    }

    // ========================================================================
    // Public API: Stats and info
    // ========================================================================

    /// Maximum number of cached pages.
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// The configuration the pool was built with.
    pub fn config(&self) -> &BufferPoolConfig {
        &self.config
    }

    /// Number of pages currently cached.
    pub fn cached_page_count(&self) -> usize {
        self.cache.lock().pages.len()
    }

    /// Whether `pid` is currently in the cache.
    pub fn is_cached(&self, pid: PageId) -> bool {
        self.cache.lock().pages.contains_key(&pid)
    }

    /// Get buffer pool statistics.
    pub fn stats(&self) -> &BufferPoolStats {
        &self.stats
    }

    /// The page lock table.
    pub fn lock_manager(&self) -> &LockManager {
        &self.lock_manager
    }

    /// The catalog pages are loaded through.
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::page::SlotLayout;
    use crate::storage::HeapFile;
    use std::time::Duration;
    use tempfile::tempdir;

    /// Pool over one table of `pages` empty pages (64-byte pages, 7 slots each).
    fn create_test_pool(capacity: usize, pages: u32) -> (BufferPool, TableId, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let layout = SlotLayout::new(64, 8).unwrap();
        let file = HeapFile::create(dir.path().join("t.dat"), layout).unwrap();
        for _ in 0..pages {
            file.append_empty_page().unwrap();
        }

        let catalog = Arc::new(Catalog::new());
        let table_id = catalog.add_table(Arc::new(file));

        let config = BufferPoolConfig::default()
            .with_capacity(capacity)
            .with_lock_timeout(Duration::from_millis(50));
        (BufferPool::new(config, catalog), table_id, dir)
    }

    fn tid(n: u64) -> TransactionId {
        TransactionId::new(n)
    }

    #[test]
    #[should_panic(expected = "capacity must be > 0")]
    fn test_zero_capacity_panics() {
        BufferPool::new(BufferPoolConfig::default().with_capacity(0), Arc::new(Catalog::new()));
    }

    #[test]
    fn test_get_page_miss_then_hit() {
        let (pool, table, _dir) = create_test_pool(4, 1);
        let pid = PageId::new(table, 0);

        let a = pool.get_page(tid(1), pid, Permissions::ReadOnly).unwrap();
        let b = pool.get_page(tid(1), pid, Permissions::ReadOnly).unwrap();
        assert!(a.same_page(&b));

        let snapshot = pool.stats().snapshot();
        assert_eq!(snapshot.cache_misses, 1);
        assert_eq!(snapshot.cache_hits, 1);
        assert_eq!(pool.cached_page_count(), 1);
    }

    #[test]
    fn test_get_page_takes_lock() {
        let (pool, table, _dir) = create_test_pool(4, 2);
        let p0 = PageId::new(table, 0);
        let p1 = PageId::new(table, 1);

        pool.get_page(tid(1), p0, Permissions::ReadOnly).unwrap();
        pool.get_page(tid(1), p1, Permissions::ReadWrite).unwrap();

        let locks = pool.lock_manager();
        assert_eq!(locks.lock_mode(tid(1), p0), Some(LockMode::Shared));
        assert_eq!(locks.lock_mode(tid(1), p1), Some(LockMode::Exclusive));
    }

    #[test]
    fn test_unknown_table() {
        let (pool, _table, _dir) = create_test_pool(4, 1);
        let err = pool
            .get_page(tid(1), PageId::new(TableId(0xdead), 0), Permissions::ReadOnly)
            .unwrap_err();
        assert!(matches!(err, Error::TableNotFound(_)));
    }

    #[test]
    fn test_page_past_end() {
        let (pool, table, _dir) = create_test_pool(4, 1);
        let err = pool
            .get_page(tid(1), PageId::new(table, 5), Permissions::ReadOnly)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPage(_)));
        assert_eq!(pool.cached_page_count(), 0);
    }

    #[test]
    fn test_evicts_least_recently_fetched() {
        let (pool, table, _dir) = create_test_pool(2, 3);
        let [a, b, c] = [0, 1, 2].map(|n| PageId::new(table, n));

        pool.get_page(tid(1), a, Permissions::ReadOnly).unwrap();
        pool.get_page(tid(1), b, Permissions::ReadOnly).unwrap();
        pool.get_page(tid(1), a, Permissions::ReadOnly).unwrap();
        pool.get_page(tid(1), c, Permissions::ReadOnly).unwrap();

        assert!(pool.is_cached(a));
        assert!(!pool.is_cached(b));
        assert!(pool.is_cached(c));
        assert_eq!(pool.stats().snapshot().evictions, 1);
    }

    #[test]
    fn test_dirty_pages_are_not_evicted() {
        let (pool, table, _dir) = create_test_pool(2, 3);
        let [a, b, c] = [0, 1, 2].map(|n| PageId::new(table, n));

        let ha = pool.get_page(tid(1), a, Permissions::ReadWrite).unwrap();
        ha.write().mark_dirty(true, tid(1));
        pool.get_page(tid(1), b, Permissions::ReadOnly).unwrap();

        pool.get_page(tid(1), c, Permissions::ReadOnly).unwrap();
        assert!(pool.is_cached(a));
        assert!(!pool.is_cached(b));
    }

    #[test]
    fn test_evicted_handle_is_detached() {
        // Working set of 3 pages against capacity 2: A is clean when B and C
        // arrive, so it is evicted even though tid 1 holds it exclusively.
        let (pool, table, _dir) = create_test_pool(2, 3);
        let [a, b, c] = [0, 1, 2].map(|n| PageId::new(table, n));

        let ha = pool.get_page(tid(1), a, Permissions::ReadWrite).unwrap();
        pool.get_page(tid(1), b, Permissions::ReadOnly).unwrap();
        pool.get_page(tid(1), c, Permissions::ReadOnly).unwrap();
        assert!(!pool.is_cached(a));
        assert!(pool.holds_lock(tid(1), a));

        {
            let mut page = ha.write();
            page.insert_record(&mut Record::new(vec![4u8; 8])).unwrap();
            page.mark_dirty(true, tid(1));
        }

        // The write went to a page the pool no longer tracks.
        pool.commit(tid(1)).unwrap();
        assert_eq!(pool.stats().snapshot().pages_written, 0);

        let on_disk = pool.catalog().heap_file(table).unwrap().read_page(a).unwrap();
        assert!(on_disk.records().is_empty());

        let reloaded = pool.get_page(tid(2), a, Permissions::ReadOnly).unwrap();
        assert!(!reloaded.same_page(&ha));
        assert!(reloaded.read().records().is_empty());
    }

    #[test]
    fn test_readmit_restores_evicted_page() {
        let (pool, table, _dir) = create_test_pool(2, 3);
        let [a, b, c] = [0, 1, 2].map(|n| PageId::new(table, n));

        let ha = pool.get_page(tid(1), a, Permissions::ReadWrite).unwrap();
        pool.get_page(tid(2), b, Permissions::ReadOnly).unwrap();
        pool.get_page(tid(2), c, Permissions::ReadOnly).unwrap();
        assert!(!pool.is_cached(a));

        {
            let mut page = ha.write();
            page.insert_record(&mut Record::new(vec![5u8; 8])).unwrap();
            page.mark_dirty(true, tid(1));
            pool.readmit(&ha).unwrap();
        }

        // B was the oldest clean page, so it made room for A.
        assert!(pool.is_cached(a));
        assert!(!pool.is_cached(b));
        assert_eq!(pool.cached_page_count(), 2);

        pool.commit(tid(1)).unwrap();
        let on_disk = pool.catalog().heap_file(table).unwrap().read_page(a).unwrap();
        assert_eq!(on_disk.records().len(), 1);
    }

    #[test]
    fn test_readmit_of_cached_page_is_noop() {
        let (pool, table, _dir) = create_test_pool(2, 1);
        let pid = PageId::new(table, 0);

        let handle = pool.get_page(tid(1), pid, Permissions::ReadWrite).unwrap();
        pool.readmit(&handle).unwrap();

        let again = pool.get_page(tid(1), pid, Permissions::ReadWrite).unwrap();
        assert!(again.same_page(&handle));
        assert_eq!(pool.cached_page_count(), 1);
    }

    #[test]
    fn test_eviction_exhausted() {
        let (pool, table, _dir) = create_test_pool(2, 3);

        for n in 0..2 {
            let h = pool
                .get_page(tid(1), PageId::new(table, n), Permissions::ReadWrite)
                .unwrap();
            h.write().mark_dirty(true, tid(1));
        }

        let err = pool
            .get_page(tid(1), PageId::new(table, 2), Permissions::ReadOnly)
            .unwrap_err();
        assert!(matches!(err, Error::EvictionExhausted { capacity: 2 }));
        assert_eq!(pool.cached_page_count(), 2);
        assert!(matches!(pool.evict_page(), Err(Error::EvictionExhausted { .. })));
    }

    #[test]
    fn test_discard_page() {
        let (pool, table, _dir) = create_test_pool(4, 1);
        let pid = PageId::new(table, 0);

        let h = pool.get_page(tid(1), pid, Permissions::ReadWrite).unwrap();
        h.write().insert_record(&mut Record::new(vec![7u8; 8])).unwrap();
        h.write().mark_dirty(true, tid(1));

        pool.discard_page(pid);
        assert!(!pool.is_cached(pid));
        assert_eq!(pool.stats().snapshot().discards, 1);

        let reloaded = pool.get_page(tid(1), pid, Permissions::ReadOnly).unwrap();
        assert!(reloaded.read().records().is_empty());
    }

    #[test]
    fn test_flush_page_clears_dirty() {
        let (pool, table, _dir) = create_test_pool(4, 1);
        let pid = PageId::new(table, 0);

        let h = pool.get_page(tid(1), pid, Permissions::ReadWrite).unwrap();
        {
            let mut page = h.write();
            page.insert_record(&mut Record::new(vec![1u8; 8])).unwrap();
            page.mark_dirty(true, tid(1));
        }

        pool.flush_page(pid).unwrap();
        assert!(!h.read().is_dirty());
        assert_eq!(pool.stats().snapshot().pages_written, 1);

        // Clean pages are not rewritten.
        pool.flush_all_pages().unwrap();
        assert_eq!(pool.stats().snapshot().pages_written, 1);
    }

    #[test]
    fn test_flush_pages_only_touches_held_pages() {
        let (pool, table, _dir) = create_test_pool(4, 2);
        let p0 = PageId::new(table, 0);
        let p1 = PageId::new(table, 1);

        let h0 = pool.get_page(tid(1), p0, Permissions::ReadWrite).unwrap();
        h0.write().mark_dirty(true, tid(1));
        let h1 = pool.get_page(tid(2), p1, Permissions::ReadWrite).unwrap();
        h1.write().mark_dirty(true, tid(2));

        pool.flush_pages(tid(1)).unwrap();
        assert!(!h0.read().is_dirty());
        assert!(h1.read().is_dirty());
        assert!(pool.is_cached(p0));
    }

    #[test]
    fn test_commit_releases_locks() {
        let (pool, table, _dir) = create_test_pool(4, 1);
        let pid = PageId::new(table, 0);

        let mut record = Record::new(vec![9u8; 8]);
        pool.insert_record(tid(1), table, &mut record).unwrap();
        assert!(pool.holds_lock(tid(1), pid));

        pool.commit(tid(1)).unwrap();
        assert!(!pool.holds_lock(tid(1), pid));

        let h = pool.get_page(tid(2), pid, Permissions::ReadOnly).unwrap();
        assert!(!h.read().is_dirty());
        assert_eq!(h.read().records().len(), 1);
    }

    #[test]
    fn test_abort_discards_held_pages() {
        let (pool, table, _dir) = create_test_pool(4, 1);
        let pid = PageId::new(table, 0);

        pool.insert_record(tid(1), table, &mut Record::new(vec![9u8; 8]))
            .unwrap();
        pool.transaction_complete(tid(1), false).unwrap();

        assert!(!pool.is_cached(pid));
        assert!(pool.lock_manager().pages_held(tid(1)).is_empty());

        let h = pool.get_page(tid(2), pid, Permissions::ReadOnly).unwrap();
        assert!(h.read().records().is_empty());
    }

    #[test]
    fn test_release_page() {
        let (pool, table, _dir) = create_test_pool(4, 1);
        let pid = PageId::new(table, 0);

        pool.get_page(tid(1), pid, Permissions::ReadWrite).unwrap();
        pool.release_page(tid(1), pid);
        assert!(!pool.holds_lock(tid(1), pid));

        pool.get_page(tid(2), pid, Permissions::ReadWrite).unwrap();
    }

    #[test]
    fn test_conflicting_lock_aborts() {
        let (pool, table, _dir) = create_test_pool(4, 1);
        let pid = PageId::new(table, 0);

        pool.get_page(tid(1), pid, Permissions::ReadWrite).unwrap();
        let err = pool.get_page(tid(2), pid, Permissions::ReadOnly).unwrap_err();
        assert!(err.is_transaction_aborted());
        assert_eq!(pool.lock_manager().exclusive_holder(pid), Some(tid(1)));
    }

    #[test]
    fn test_delete_record_without_location() {
        let (pool, _table, _dir) = create_test_pool(4, 1);
        let err = pool.delete_record(tid(1), &Record::new(vec![0u8; 8])).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord(_)));
    }

    #[test]
    fn test_concurrent_readers() {
        use std::thread;

        let (pool, table, _dir) = create_test_pool(4, 1);
        let pool = Arc::new(pool);
        let pid = PageId::new(table, 0);

        let mut handles = vec![];
        for n in 0..8 {
            let pool = Arc::clone(&pool);
            handles.push(thread::spawn(move || {
                let h = pool.get_page(tid(100 + n), pid, Permissions::ReadOnly).unwrap();
                assert_eq!(h.page_id(), pid);
                pool.commit(tid(100 + n)).unwrap();
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(pool.cached_page_count(), 1);
    }
}
