//! Common types and utilities shared across heapdb.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants and [`BufferPoolConfig`]
//! - Error types
//! - Identifiers (TableId, PageId, TransactionId)
//! - Access [`Permissions`]

pub mod config;
pub mod error;
mod page_id;
mod transaction_id;

pub use config::BufferPoolConfig;
pub use error::{Error, Result};
pub use page_id::{PageId, TableId};
pub use transaction_id::TransactionId;

/// Access a transaction requests when fetching a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permissions {
    /// Read access, granted under a shared lock.
    ReadOnly,
    /// Read/write access, granted under an exclusive lock.
    ReadWrite,
}
