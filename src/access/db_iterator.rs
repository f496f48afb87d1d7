//! The iterator contract shared by every record source.

use crate::common::{Error, Result};
use crate::storage::page::Record;

/// Forward-only, restartable iteration over records.
///
/// Unlike [`Iterator`], advancing can fail (a page fetch may time out on a
/// lock), and the cursor has an explicit open/closed state:
/// - every call other than `open` fails with `Error::IteratorNotOpen` until
///   `open` is called, and again after `close`
/// - `next` on an exhausted iterator fails with `Error::NoSuchElement`
/// - `rewind` restarts from the first record
pub trait DbIterator {
    fn open(&mut self) -> Result<()>;

    fn has_next(&mut self) -> Result<bool>;

    fn next(&mut self) -> Result<Record>;

    fn rewind(&mut self) -> Result<()>;

    fn close(&mut self);

    /// Drain the remaining records into a `Vec`.
    fn collect_remaining(&mut self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        while self.has_next()? {
            records.push(self.next()?);
        }
        Ok(records)
    }
}

/// [`DbIterator`] over records already in memory.
#[derive(Debug, Clone)]
pub struct RecordListIterator {
    records: Vec<Record>,
    position: usize,
    open: bool,
}

impl RecordListIterator {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            position: 0,
            open: false,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(Error::IteratorNotOpen)
        }
    }
}

impl DbIterator for RecordListIterator {
    fn open(&mut self) -> Result<()> {
        self.open = true;
        self.position = 0;
        Ok(())
    }

    fn has_next(&mut self) -> Result<bool> {
        self.ensure_open()?;
        Ok(self.position < self.records.len())
    }

    fn next(&mut self) -> Result<Record> {
        self.ensure_open()?;
        let record = self
            .records
            .get(self.position)
            .cloned()
            .ok_or(Error::NoSuchElement)?;
        self.position += 1;
        Ok(record)
    }

    fn rewind(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.position = 0;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }
}
