//! Heap File - the page store behind one table.
//!
//! The [`HeapFile`] handles all direct file operations for a table:
//! - Reading and writing whole pages
//! - Growing the extent one page at a time
//! - First-fit record placement and record deletion (through the buffer pool)
//! - Forward scans

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::access::HeapScan;
use crate::buffer::{BufferPool, PageHandle};
use crate::common::{Error, PageId, Permissions, Result, TableId, TransactionId};
use crate::storage::page::{HeapPage, Record, SlotLayout};

/// Page store for a single table, backed by one file.
///
/// # File Layout
/// Pages are laid out back to back; there is no file header:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0     P        2P      ...      N×P        (P = page size)
/// ```
///
/// The page count is always derived from the file length, so pages appended
/// through one handle are visible to every reader of the file.
///
/// # Thread Safety
/// The file handle sits behind a `Mutex`; each read, write, or append is one
/// critical section covering seek and transfer.
///
/// # Durability
/// Every write and append is followed by `fsync()`.
pub struct HeapFile {
    file: Mutex<File>,
    path: PathBuf,
    table_id: TableId,
    layout: SlotLayout,
}

impl HeapFile {
    /// Create a new, empty heap file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P, layout: SlotLayout) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)?;

        Self::from_file(file, path.as_ref(), layout)
    }

    /// Open an existing heap file.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P, layout: SlotLayout) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        Self::from_file(file, path.as_ref(), layout)
    }

    /// Open an existing heap file, or create it if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P, layout: SlotLayout) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path, layout)
        } else {
            Self::create(path, layout)
        }
    }

    fn from_file(file: File, path: &Path, layout: SlotLayout) -> Result<Self> {
        let path = path.canonicalize()?;
        let table_id = TableId::from_bytes(path.as_os_str().as_encoded_bytes());

        Ok(Self {
            file: Mutex::new(file),
            path,
            table_id,
            layout,
        })
    }

    /// Replace the path-derived table id.
    pub fn with_table_id(mut self, table_id: TableId) -> Self {
        self.table_id = table_id;
        self
    }

    #[inline]
    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    #[inline]
    pub fn layout(&self) -> &SlotLayout {
        &self.layout
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of whole pages in the file.
    pub fn page_count(&self) -> Result<u32> {
        let file = self.file.lock();
        Self::page_count_of(&file, self.layout.page_size())
    }

    fn page_count_of(file: &File, page_size: usize) -> Result<u32> {
        let len = file.metadata()?.len();
        Ok((len / page_size as u64) as u32)
    }

    fn offset_of(&self, pid: PageId) -> u64 {
        pid.page_no as u64 * self.layout.page_size() as u64
    }

    // ========================================================================
    // Raw page I/O
    // ========================================================================

    /// Read a page from disk.
    ///
    /// # Errors
    /// - `Error::InvalidPage` if the page belongs to another table or is past
    ///   the end of the file
    /// - `Error::Storage` on I/O failure
    pub fn read_page(&self, pid: PageId) -> Result<HeapPage> {
        let mut file = self.file.lock();
        if pid.table_id != self.table_id
            || pid.page_no >= Self::page_count_of(&file, self.layout.page_size())?
        {
            return Err(Error::InvalidPage(pid));
        }

        file.seek(SeekFrom::Start(self.offset_of(pid)))?;
        let mut data = vec![0u8; self.layout.page_size()];
        file.read_exact(&mut data)?;
        drop(file);

        trace!(%pid, "read page");
        HeapPage::from_bytes(pid, self.layout, data)
    }

    /// Overwrite a page in place.
    ///
    /// Only pages that already exist can be written; the extent grows through
    /// [`HeapFile::append_empty_page`].
    ///
    /// # Errors
    /// - `Error::InvalidPage` if the page belongs to another table or is past
    ///   the end of the file
    /// - `Error::Storage` on I/O failure
    pub fn write_page(&self, page: &HeapPage) -> Result<()> {
        let pid = page.id();
        let mut file = self.file.lock();
        if pid.table_id != self.table_id
            || pid.page_no >= Self::page_count_of(&file, self.layout.page_size())?
        {
            return Err(Error::InvalidPage(pid));
        }

        file.seek(SeekFrom::Start(self.offset_of(pid)))?;
        file.write_all(page.as_slice())?;
        file.sync_all()?;

        trace!(%pid, "wrote page");
        Ok(())
    }

    /// Grow the extent by one empty page and return its id.
    pub fn append_empty_page(&self) -> Result<PageId> {
        let mut file = self.file.lock();
        let page_no = Self::page_count_of(&file, self.layout.page_size())?;
        let pid = PageId::new(self.table_id, page_no);

        file.seek(SeekFrom::Start(self.offset_of(pid)))?;
        file.write_all(&HeapPage::empty_page_data(&self.layout))?;
        file.sync_all()?;

        debug!(%pid, "appended empty page");
        Ok(pid)
    }

    // ========================================================================
    // Record operations (through the buffer pool)
    // ========================================================================

    /// Place `record` in the first page with a free slot.
    ///
    /// Pages are tried in ascending order, each fetched with `ReadWrite`
    /// permission. A page that turns out to be full is unlocked again
    /// unless `tid` already held a lock on it. When every page is full, an
    /// empty page is appended and the record goes there. The page that
    /// receives the record is marked dirty by `tid`, and `record` gets its
    /// new record id.
    ///
    /// # Errors
    /// - `Error::RecordSizeMismatch` if the payload width is wrong
    /// - any error from [`BufferPool::get_page`]
    pub fn insert_record(
        &self,
        pool: &BufferPool,
        tid: TransactionId,
        record: &mut Record,
    ) -> Result<Vec<PageHandle>> {
        let record_size = self.layout.record_size();
        if record.data().len() != record_size {
            return Err(Error::RecordSizeMismatch {
                expected: record_size,
                actual: record.data().len(),
            });
        }

        for page_no in 0..self.page_count()? {
            let pid = PageId::new(self.table_id, page_no);
            let held_before = pool.holds_lock(tid, pid);
            let handle = pool.get_page(tid, pid, Permissions::ReadWrite)?;

            let mut page = handle.write();
            if page.free_slot_count() == 0 {
                drop(page);
                if !held_before {
                    pool.release_page(tid, pid);
                }
                continue;
            }

            page.insert_record(record)?;
            page.mark_dirty(true, tid);
            pool.readmit(&handle)?;
            drop(page);
            return Ok(vec![handle]);
        }

        let pid = self.append_empty_page()?;
        let handle = pool.get_page(tid, pid, Permissions::ReadWrite)?;
        {
            let mut page = handle.write();
            page.insert_record(record)?;
            page.mark_dirty(true, tid);
            pool.readmit(&handle)?;
        }
        Ok(vec![handle])
    }

    /// Free the slot `record` occupies.
    ///
    /// # Errors
    /// - `Error::InvalidRecord` if the record has no location, belongs to
    ///   another table, points past the end of the file, or its slot is free
    /// - any error from [`BufferPool::get_page`]
    pub fn delete_record(
        &self,
        pool: &BufferPool,
        tid: TransactionId,
        record: &Record,
    ) -> Result<Vec<PageHandle>> {
        let rid = record
            .record_id()
            .ok_or_else(|| Error::InvalidRecord("record has no location".to_string()))?;

        if rid.page_id.table_id != self.table_id {
            return Err(Error::InvalidRecord(format!(
                "{} does not belong to {}",
                rid, self.table_id
            )));
        }
        if rid.page_id.page_no >= self.page_count()? {
            return Err(Error::InvalidRecord(format!("{} is past the end of the table", rid)));
        }

        let handle = pool.get_page(tid, rid.page_id, Permissions::ReadWrite)?;
        {
            let mut page = handle.write();
            page.delete_record(record)?;
            page.mark_dirty(true, tid);
            pool.readmit(&handle)?;
        }
        Ok(vec![handle])
    }

    /// A forward scan over every live record, read with `ReadOnly` access.
    pub fn scan<'a>(self: &Arc<Self>, pool: &'a BufferPool, tid: TransactionId) -> HeapScan<'a> {
        HeapScan::new(Arc::clone(self), pool, tid)
    }
}

impl std::fmt::Debug for HeapFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeapFile")
            .field("path", &self.path)
            .field("table_id", &self.table_id)
            .field("layout", &self.layout)
            .finish()
    }
}
