//! Table and page identifier types.

use std::fmt;

/// Identifies a table, and with it the heap file backing the table.
///
/// Heap files derive this from the CRC32 of their canonical path unless an id
/// is assigned explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(pub u32);

impl TableId {
    /// Derive a table id from arbitrary bytes (typically a file path).
    pub fn from_bytes(bytes: &[u8]) -> Self {
        TableId(crc32fast::hash(bytes))
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Table({})", self.0)
    }
}

/// Identifies a fixed-size page within a table's extent.
///
/// Page `n` of a table lives at byte offset `n × page_size` of the table's
/// heap file.
///
/// # Example
/// ```
/// use heapdb::{PageId, TableId};
///
/// let pid = PageId::new(TableId(7), 3);
/// assert_eq!(pid.table_id, TableId(7));
/// assert_eq!(pid.page_no, 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId {
    pub table_id: TableId,
    pub page_no: u32,
}

impl PageId {
    /// Create a new PageId.
    #[inline]
    pub fn new(table_id: TableId, page_no: u32) -> Self {
        PageId { table_id, page_no }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Page({}:{})", self.table_id.0, self.page_no)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_page_id_equality_by_value() {
        let a = PageId::new(TableId(1), 5);
        let b = PageId::new(TableId(1), 5);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
        assert!(!set.contains(&PageId::new(TableId(2), 5)));
    }

    #[test]
    fn test_page_id_ordering() {
        assert!(PageId::new(TableId(1), 1) < PageId::new(TableId(1), 2));
        assert!(PageId::new(TableId(1), 9) < PageId::new(TableId(2), 0));
    }

    #[test]
    fn test_page_id_display() {
        assert_eq!(format!("{}", PageId::new(TableId(4), 42)), "Page(4:42)");
        assert_eq!(format!("{}", TableId(4)), "Table(4)");
    }

    #[test]
    fn test_table_id_from_bytes_is_stable() {
        let a = TableId::from_bytes(b"/tmp/students.dat");
        let b = TableId::from_bytes(b"/tmp/students.dat");
        let c = TableId::from_bytes(b"/tmp/courses.dat");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
