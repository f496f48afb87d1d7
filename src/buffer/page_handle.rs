//! Shared handles to cached pages.
//!
//! A [`PageHandle`] is what [`BufferPool::get_page`](super::BufferPool::get_page)
//! returns. Every fetch of a cached page hands out a handle to the same
//! in-memory instance, so a write made through one handle is visible through
//! all of them. Transaction locks decide *who* may touch a page; the handle's
//! `RwLock` only keeps individual reads and writes from tearing.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::PageId;
use crate::storage::page::HeapPage;

/// Reference-counted access to a page in the buffer pool.
///
/// # Example
/// ```ignore
/// let handle = pool.get_page(tid, pid, Permissions::ReadWrite)?;
/// {
///     let mut page = handle.write();
///     page.insert_record(&mut record)?;
///     page.mark_dirty(true, tid);
/// }
/// let live = handle.read().records().len();
/// ```
#[derive(Debug, Clone)]
pub struct PageHandle {
    pid: PageId,
    page: Arc<RwLock<HeapPage>>,
}

impl PageHandle {
    pub(crate) fn new(page: HeapPage) -> Self {
        Self {
            pid: page.id(),
            page: Arc::new(RwLock::new(page)),
        }
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.pid
    }

    /// Lock the page for reading.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, HeapPage> {
        self.page.read()
    }

    /// Lock the page for writing.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, HeapPage> {
        self.page.write()
    }

    /// Lock the page for reading unless a writer currently holds it.
    #[inline]
    pub fn try_read(&self) -> Option<RwLockReadGuard<'_, HeapPage>> {
        self.page.try_read()
    }

    /// Whether two handles refer to the same in-memory page.
    #[inline]
    pub fn same_page(&self, other: &PageHandle) -> bool {
        Arc::ptr_eq(&self.page, &other.page)
    }
}
