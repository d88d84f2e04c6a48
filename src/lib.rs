//! Jira users, boards and projects as queryable tables.
//!
//! - [`jira`] - REST client, typed records, per-resource scans and lookups
//! - [`scan`] - offset pagination and the hydrate concurrency gate
//! - [`table`] - table registry, row projection and query execution
//! - [`config`] - connection configuration (file, environment, flags)

pub mod config;
pub mod error;
pub mod jira;
pub mod scan;
pub mod table;

pub use error::{ConnectorError, Result};
