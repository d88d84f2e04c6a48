//! Scan mechanics shared by every table
//!
//! - [`pager`] - offset pagination with early stop on a row limit
//! - [`gate`] - concurrency ceiling for per-row hydrate calls

pub mod gate;
pub mod pager;

pub use gate::{HydrateGate, DEFAULT_MAX_CONCURRENCY};
pub use pager::{effective_page_size, paginate, Page, ScanCursor, DEFAULT_PAGE_SIZE};
