//! Fixed-width records and their on-page locations.

use std::fmt;

use crate::common::PageId;

/// Location of a record: the page it lives on and its slot number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    pub page_id: PageId,
    pub slot: u16,
}

impl RecordId {
    #[inline]
    pub fn new(page_id: PageId, slot: u16) -> Self {
        Self { page_id, slot }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.page_id, self.slot)
    }
}

/// A record payload plus, once stored, its location.
///
/// The payload width must equal the record size of the table it is inserted
/// into; field encoding inside the payload is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    rid: Option<RecordId>,
    data: Vec<u8>,
}

impl Record {
    /// Create an unplaced record.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            rid: None,
            data: data.into(),
        }
    }

    pub(crate) fn placed(rid: RecordId, data: Vec<u8>) -> Self {
        Self {
            rid: Some(rid),
            data,
        }
    }

    /// Where the record is stored, if it has been placed.
    #[inline]
    pub fn record_id(&self) -> Option<RecordId> {
        self.rid
    }

    #[inline]
    pub fn set_record_id(&mut self, rid: Option<RecordId>) {
        self.rid = rid;
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
