//! Storage layer - heap files and page formats.
//!
//! This module handles persistent storage:
//! - [`HeapFile`] - Page store for one table (file I/O, record placement)
//! - [`Catalog`] - Table id to heap file binding
//! - [`page`] - Page layout, records and record ids

mod catalog;
mod heap_file;
pub mod page;

pub use catalog::Catalog;
pub use heap_file::HeapFile;
