//! Table abstraction layer
//!
//! Jira resources exposed as tables. Schemas are data, loaded from JSON at
//! compile time; each column names a path into a typed record and, when the
//! listing does not carry the value, the hydrate call that provides it.
//!
//! # Architecture
//!
//! - [`registry`] - Loads and caches table definitions from embedded JSON
//! - [`row`] - Column projection, path extraction and type coercion
//! - [`executor`] - Runs scans and single-row lookups with hydration
//!
//! # Table Definitions
//!
//! Tables are defined in `src/tables/jira.json`:
//! - `jira_user` - users, hydrated with group memberships
//! - `jira_board` - agile boards, hydrated with board configuration
//! - `jira_project` - projects, hydrated with component ids
//!
//! # Example
//!
//! ```ignore
//! use futures::TryStreamExt;
//! use jira_tables::table::{scan_table, QueryContext};
//!
//! async fn first_boards(client: &jira_tables::jira::JiraClient) -> jira_tables::Result<()> {
//!     let ctx = QueryContext::default().with_limit(Some(10));
//!     let rows: Vec<_> = scan_table(client, "jira_board", &ctx)?.try_collect().await?;
//!     Ok(())
//! }
//! ```

pub mod executor;
pub mod registry;
pub mod row;

pub use executor::{get_row, scan_table, QueryContext};
pub use registry::*;
pub use row::{Cell, Row, RowPlan};
