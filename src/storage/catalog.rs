//! Catalog - table id to heap file binding.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::common::{Error, Result, TableId};
use crate::storage::HeapFile;

/// Maps table ids to the heap files that store them.
///
/// The buffer pool only ever looks tables up; registration is the embedding
/// application's job.
#[derive(Debug, Default)]
pub struct Catalog {
    tables: RwLock<HashMap<TableId, Arc<HeapFile>>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a heap file under its own table id, replacing any previous
    /// binding for that id.
    pub fn add_table(&self, file: Arc<HeapFile>) -> TableId {
        let table_id = file.table_id();
        self.tables.write().insert(table_id, file);
        table_id
    }

    /// Look up the heap file for `table_id`.
    ///
    /// # Errors
    /// `Error::TableNotFound` if nothing is registered under the id.
    pub fn heap_file(&self, table_id: TableId) -> Result<Arc<HeapFile>> {
        self.tables
            .read()
            .get(&table_id)
            .cloned()
            .ok_or(Error::TableNotFound(table_id))
    }

    /// Registered table ids, in ascending order.
    pub fn table_ids(&self) -> Vec<TableId> {
        let mut ids: Vec<TableId> = self.tables.read().keys().copied().collect();
        ids.sort();
        ids
    }
}
