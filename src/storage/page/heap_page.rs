//! HeapPage - a decoded heap file page.
//!
//! A [`HeapPage`] owns one page image (`page_size` bytes) and interprets it
//! through a [`SlotLayout`]. It also carries the dirty marker the buffer pool
//! uses to decide what may be evicted and what must be forced at commit.

use crate::common::{Error, PageId, Result, TransactionId};

use super::record::{Record, RecordId};
use super::slot_layout::SlotLayout;

/// An in-memory heap page.
///
/// # Dirty Tracking
/// `dirtied_by` is `Some(tid)` while the page holds changes made by `tid`
/// that have not reached the heap file, and `None` when the page matches
/// disk. Callers mutate it only through [`HeapPage::mark_dirty`].
///
/// # Example
/// ```
/// use heapdb::storage::page::{HeapPage, Record, SlotLayout};
/// use heapdb::{PageId, TableId, TransactionId};
///
/// let layout = SlotLayout::new(64, 8).unwrap();
/// let mut page = HeapPage::empty(PageId::new(TableId(1), 0), layout);
///
/// let mut record = Record::new(vec![7u8; 8]);
/// let rid = page.insert_record(&mut record).unwrap();
/// assert_eq!(rid.slot, 0);
/// assert_eq!(page.free_slot_count(), 6);
///
/// page.mark_dirty(true, TransactionId::new(1));
/// assert!(page.is_dirty());
/// ```
#[derive(Debug)]
pub struct HeapPage {
    pid: PageId,
    layout: SlotLayout,
    data: Box<[u8]>,
    dirtied_by: Option<TransactionId>,
}

impl HeapPage {
    /// Decode a page image read from disk.
    ///
    /// # Errors
    /// `Error::InvalidPage` if the image is not exactly one page long.
    pub fn from_bytes(pid: PageId, layout: SlotLayout, data: Vec<u8>) -> Result<Self> {
        if data.len() != layout.page_size() {
            return Err(Error::InvalidPage(pid));
        }

        Ok(Self {
            pid,
            layout,
            data: data.into_boxed_slice(),
            dirtied_by: None,
        })
    }

    /// Create a page with every slot free.
    pub fn empty(pid: PageId, layout: SlotLayout) -> Self {
        Self {
            pid,
            layout,
            data: Self::empty_page_data(&layout).into_boxed_slice(),
            dirtied_by: None,
        }
    }

    /// The byte image of an empty page.
    pub fn empty_page_data(layout: &SlotLayout) -> Vec<u8> {
        vec![0u8; layout.page_size()]
    }

    #[inline]
    pub fn id(&self) -> PageId {
        self.pid
    }

    #[inline]
    pub fn layout(&self) -> &SlotLayout {
        &self.layout
    }

    /// Raw page image, as written to disk.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    // ========================================================================
    // Dirty tracking
    // ========================================================================

    /// Mark the page dirty on behalf of `tid`, or clean.
    ///
    /// `mark_dirty(false, _)` clears the marker regardless of owner.
    pub fn mark_dirty(&mut self, dirty: bool, tid: TransactionId) {
        self.dirtied_by = if dirty { Some(tid) } else { None };
    }

    /// The transaction that last dirtied this page, if any.
    #[inline]
    pub fn dirtied_by(&self) -> Option<TransactionId> {
        self.dirtied_by
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirtied_by.is_some()
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirtied_by = None;
    }

    // ========================================================================
    // Slots
    // ========================================================================

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.layout.slot_count()
    }

    #[inline]
    pub fn is_slot_used(&self, slot: usize) -> bool {
        slot < self.layout.slot_count() && self.layout.is_slot_used(&self.data, slot)
    }

    /// Number of free slots.
    pub fn free_slot_count(&self) -> usize {
        (0..self.slot_count())
            .filter(|&slot| !self.layout.is_slot_used(&self.data, slot))
            .count()
    }

    fn first_free_slot(&self) -> Option<usize> {
        (0..self.slot_count()).find(|&slot| !self.layout.is_slot_used(&self.data, slot))
    }

    /// Store `record` in the lowest free slot and set its record id.
    ///
    /// Does not touch the dirty marker; the caller knows which transaction
    /// is responsible.
    ///
    /// # Errors
    /// - `Error::RecordSizeMismatch` if the payload width is wrong
    /// - `Error::PageFull` if no slot is free
    pub fn insert_record(&mut self, record: &mut Record) -> Result<RecordId> {
        let record_size = self.layout.record_size();
        if record.data().len() != record_size {
            return Err(Error::RecordSizeMismatch {
                expected: record_size,
                actual: record.data().len(),
            });
        }

        let slot = self.first_free_slot().ok_or(Error::PageFull(self.pid))?;
        let offset = self.layout.slot_offset(slot);
        self.data[offset..offset + record_size].copy_from_slice(record.data());
        self.layout.set_slot_used(&mut self.data, slot, true);

        // slot_count is bounded by u16::MAX in SlotLayout::new
        let rid = RecordId::new(self.pid, slot as u16);
        record.set_record_id(Some(rid));
        Ok(rid)
    }

    /// Free the slot `record` occupies.
    ///
    /// # Errors
    /// `Error::InvalidRecord` if the record is unplaced, lives on another
    /// page, or its slot is already free.
    pub fn delete_record(&mut self, record: &Record) -> Result<()> {
        let rid = record
            .record_id()
            .ok_or_else(|| Error::InvalidRecord("record has no location".to_string()))?;

        if rid.page_id != self.pid {
            return Err(Error::InvalidRecord(format!(
                "{} is not on {}",
                rid, self.pid
            )));
        }

        let slot = rid.slot as usize;
        if !self.is_slot_used(slot) {
            return Err(Error::InvalidRecord(format!("{} is not occupied", rid)));
        }

        self.layout.set_slot_used(&mut self.data, slot, false);
        let offset = self.layout.slot_offset(slot);
        self.data[offset..offset + self.layout.record_size()].fill(0);
        Ok(())
    }

    /// The record stored in `slot`, if the slot is occupied.
    pub fn record_at(&self, slot: usize) -> Option<Record> {
        if !self.is_slot_used(slot) {
            return None;
        }
        let offset = self.layout.slot_offset(slot);
        let data = self.data[offset..offset + self.layout.record_size()].to_vec();
        Some(Record::placed(RecordId::new(self.pid, slot as u16), data))
    }

    /// All live records in slot order.
    pub fn records(&self) -> Vec<Record> {
        (0..self.slot_count())
            .filter_map(|slot| self.record_at(slot))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::TableId;

    fn small_page() -> HeapPage {
        let layout = SlotLayout::new(64, 8).unwrap();
        HeapPage::empty(PageId::new(TableId(1), 0), layout)
    }

    #[test]
    fn test_empty_page() {
        let page = small_page();
        assert_eq!(page.slot_count(), 7);
        assert_eq!(page.free_slot_count(), 7);
        assert!(page.records().is_empty());
        assert!(!page.is_dirty());
        assert_eq!(page.as_slice().len(), 64);
    }

    #[test]
    fn test_insert_fills_lowest_slot_first() {
        let mut page = small_page();

        for expected_slot in 0..3u16 {
            let mut record = Record::new(vec![expected_slot as u8; 8]);
            let rid = page.insert_record(&mut record).unwrap();
            assert_eq!(rid.slot, expected_slot);
            assert_eq!(record.record_id(), Some(rid));
        }

        // Free slot 1, the next insert reuses it
        let victim = page.record_at(1).unwrap();
        page.delete_record(&victim).unwrap();

        let mut record = Record::new(vec![9u8; 8]);
        assert_eq!(page.insert_record(&mut record).unwrap().slot, 1);
    }

    #[test]
    fn test_insert_into_full_page() {
        let mut page = small_page();
        for _ in 0..7 {
            page.insert_record(&mut Record::new(vec![1u8; 8])).unwrap();
        }
        assert_eq!(page.free_slot_count(), 0);

        let err = page.insert_record(&mut Record::new(vec![1u8; 8])).unwrap_err();
        assert!(matches!(err, Error::PageFull(_)));
    }

    #[test]
    fn test_insert_wrong_width() {
        let mut page = small_page();
        let err = page.insert_record(&mut Record::new(vec![1u8; 3])).unwrap_err();
        assert!(matches!(
            err,
            Error::RecordSizeMismatch {
                expected: 8,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_delete_rejects_foreign_and_free_slots() {
        let mut page = small_page();

        // Unplaced
        assert!(page.delete_record(&Record::new(vec![0u8; 8])).is_err());

        // Other page
        let foreign = Record::placed(RecordId::new(PageId::new(TableId(1), 9), 0), vec![0; 8]);
        assert!(matches!(
            page.delete_record(&foreign),
            Err(Error::InvalidRecord(_))
        ));

        // Free slot on this page
        let free = Record::placed(RecordId::new(page.id(), 2), vec![0; 8]);
        assert!(matches!(
            page.delete_record(&free),
            Err(Error::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_bytes_roundtrip_keeps_records() {
        let mut page = small_page();
        page.insert_record(&mut Record::new(b"abcdefgh".to_vec())).unwrap();
        page.insert_record(&mut Record::new(b"ijklmnop".to_vec())).unwrap();

        let decoded =
            HeapPage::from_bytes(page.id(), *page.layout(), page.as_slice().to_vec()).unwrap();
        let records = decoded.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].data(), b"abcdefgh");
        assert_eq!(records[1].data(), b"ijklmnop");
        assert_eq!(records[1].record_id().unwrap().slot, 1);
    }

    #[test]
    fn test_from_bytes_wrong_length() {
        let layout = SlotLayout::new(64, 8).unwrap();
        let pid = PageId::new(TableId(1), 0);
        assert!(matches!(
            HeapPage::from_bytes(pid, layout, vec![0u8; 63]),
            Err(Error::InvalidPage(_))
        ));
    }

    #[test]
    fn test_mark_dirty_contract() {
        let mut page = small_page();
        let tid = TransactionId::new(5);

        page.mark_dirty(true, tid);
        assert_eq!(page.dirtied_by(), Some(tid));

        page.mark_dirty(false, tid);
        assert_eq!(page.dirtied_by(), None);
        assert!(!page.is_dirty());
    }
}
