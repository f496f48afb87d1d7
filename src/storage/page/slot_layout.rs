//! Slot arithmetic for heap pages.
//!
//! Every heap page starts with an occupancy bitmap followed by fixed-width
//! record slots:
//!
//! ```text
//! ┌──────────────────────┬──────────┬──────────┬─────┬──────────┬─────────┐
//! │ bitmap               │ slot 0   │ slot 1   │ ... │ slot N-1 │ padding │
//! │ ceil(N / 8) bytes    │ R bytes  │ R bytes  │     │ R bytes  │ zeros   │
//! └──────────────────────┴──────────┴──────────┴─────┴──────────┴─────────┘
//! N = floor(page_size × 8 / (R × 8 + 1))
//! ```
//!
//! Bit `i` lives at `bitmap[i / 8] >> (i % 8)`; 1 means occupied.

use crate::common::config::DEFAULT_PAGE_SIZE;
use crate::common::{Error, Result};

/// Geometry of a heap page: how many fixed-width slots fit and where they are.
///
/// # Example
/// ```
/// use heapdb::storage::page::SlotLayout;
///
/// let layout = SlotLayout::new(64, 8).unwrap();
/// assert_eq!(layout.slot_count(), 7);   // 512 bits / 65 bits per slot
/// assert_eq!(layout.header_len(), 1);
/// assert_eq!(layout.slot_offset(2), 1 + 2 * 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotLayout {
    page_size: usize,
    record_size: usize,
    slot_count: usize,
    header_len: usize,
}

impl SlotLayout {
    /// Compute the layout for the given page and record sizes.
    ///
    /// # Errors
    /// `Error::InvalidLayout` if no slot fits or the slot count does not fit
    /// a `u16` slot number.
    pub fn new(page_size: usize, record_size: usize) -> Result<Self> {
        let invalid = || Error::InvalidLayout {
            page_size,
            record_size,
        };

        if page_size == 0 || record_size == 0 {
            return Err(invalid());
        }

        let page_bits = page_size.checked_mul(8).ok_or_else(invalid)?;
        let slot_bits = record_size
            .checked_mul(8)
            .and_then(|bits| bits.checked_add(1))
            .ok_or_else(invalid)?;

        let slot_count = page_bits / slot_bits;
        if slot_count == 0 || slot_count > u16::MAX as usize {
            return Err(invalid());
        }

        Ok(Self {
            page_size,
            record_size,
            slot_count,
            header_len: slot_count.div_ceil(8),
        })
    }

    /// Layout for the default 4KB page.
    pub fn with_default_page_size(record_size: usize) -> Result<Self> {
        Self::new(DEFAULT_PAGE_SIZE, record_size)
    }

    #[inline]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    #[inline]
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Size of the occupancy bitmap in bytes.
    #[inline]
    pub fn header_len(&self) -> usize {
        self.header_len
    }

    /// Byte offset of a slot within the page.
    #[inline]
    pub fn slot_offset(&self, slot: usize) -> usize {
        self.header_len + slot * self.record_size
    }

    /// Read the occupancy bit of `slot` from a page image.
    #[inline]
    pub fn is_slot_used(&self, page_data: &[u8], slot: usize) -> bool {
        debug_assert!(slot < self.slot_count);
        (page_data[slot / 8] >> (slot % 8)) & 1 == 1
    }

    /// Set or clear the occupancy bit of `slot` in a page image.
    #[inline]
    pub fn set_slot_used(&self, page_data: &mut [u8], slot: usize, used: bool) {
        debug_assert!(slot < self.slot_count);
        let mask = 1u8 << (slot % 8);
        if used {
            page_data[slot / 8] |= mask;
        } else {
            page_data[slot / 8] &= !mask;
        }
    }
}
