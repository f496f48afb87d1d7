//! heapdb - A transactional buffer pool over fixed-width heap files.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                             heapdb                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                 Access Layer (access/)                   │   │
//! │  │          DbIterator + HeapScan + RecordListIterator      │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │           Transaction Layer (concurrency/)               │   │
//! │  │      LockManager (page S/X, timeout) + Transaction       │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                Buffer Pool (buffer/)                     │   │
//! │  │   BufferPool + PageHandle + RecencyTracker + Stats       │   │
//! │  │     (clean-only eviction, flush on commit, discard       │   │
//! │  │      on abort)                                           │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │               Storage Layer (storage/)                   │   │
//! │  │      Catalog + HeapFile + HeapPage + SlotLayout          │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (ids, Error, config, Permissions)
//! - [`storage`] - Heap files, page format, catalog
//! - [`buffer`] - The buffer pool
//! - [`concurrency`] - Page locks and transactions
//! - [`access`] - Record iterators
//!
//! # Quick Start
//! ```no_run
//! use std::sync::Arc;
//! use heapdb::storage::page::{Record, SlotLayout};
//! use heapdb::{BufferPool, BufferPoolConfig, Catalog, DbIterator, HeapFile};
//!
//! let layout = SlotLayout::with_default_page_size(16).unwrap();
//! let file = HeapFile::open_or_create("people.dat", layout).unwrap();
//!
//! let catalog = Arc::new(Catalog::new());
//! let table = catalog.add_table(Arc::new(file));
//! let pool = BufferPool::new(BufferPoolConfig::default(), catalog);
//!
//! let txn = pool.begin();
//! txn.insert_record(table, &mut Record::new([7u8; 16])).unwrap();
//! txn.commit().unwrap();
//!
//! let txn = pool.begin();
//! let mut scan = txn.scan(table).unwrap();
//! scan.open().unwrap();
//! while scan.has_next().unwrap() {
//!     println!("{:?}", scan.next().unwrap().data());
//! }
//! ```

pub mod access;
pub mod buffer;
pub mod common;
pub mod concurrency;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::{DEFAULT_LOCK_TIMEOUT, DEFAULT_PAGE_SIZE, DEFAULT_POOL_PAGES};
pub use common::{
    BufferPoolConfig, Error, PageId, Permissions, Result, TableId, TransactionId,
};

pub use access::{DbIterator, HeapScan, RecordListIterator};
pub use buffer::{BufferPool, BufferPoolStats, PageHandle, StatsSnapshot};
pub use concurrency::{LockManager, LockMode, Transaction};
pub use storage::page::{HeapPage, Record, RecordId, SlotLayout};
pub use storage::{Catalog, HeapFile};
