//! Concurrency control.
//!
//! - [`LockManager`] - page-level shared/exclusive locks with bounded waits
//! - [`Transaction`] - RAII handle that commits or aborts through the pool

mod lock_manager;
mod transaction;

pub use lock_manager::{LockManager, LockMode};
pub use transaction::Transaction;
