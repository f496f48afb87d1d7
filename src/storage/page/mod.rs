//! Heap page types and layout.
//!
//! This module contains:
//! - [`SlotLayout`] - Bitmap and slot geometry for a page/record size pair
//! - [`HeapPage`] - A decoded page with its dirty marker
//! - [`Record`] / [`RecordId`] - Fixed-width payloads and their locations

mod heap_page;
mod record;
mod slot_layout;

pub use heap_page::HeapPage;
pub use record::{Record, RecordId};
pub use slot_layout::SlotLayout;
