//! Jira API interaction module
//!
//! # Module Structure
//!
//! - [`auth`] - Basic auth (API token) or bearer personal access token
//! - [`client`] - One client per connection: URLs, transport, hydrate gate
//! - [`http`] - HTTP utilities for REST API calls
//! - [`users`], [`boards`], [`projects`] - typed records, scans and lookups
//!
//! # Example
//!
//! ```ignore
//! use futures::TryStreamExt;
//! use jira_tables::jira::{boards, ConnectionSettings, Credentials, JiraClient};
//!
//! async fn example() -> jira_tables::Result<()> {
//!     let creds = Credentials::Bearer("token".into());
//!     let settings = ConnectionSettings::new("https://jira.example.com", creds)?;
//!     let client = JiraClient::connect(&settings)?;
//!     let first_ten: Vec<_> = boards::list_boards(&client, Some(10)).try_collect().await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod boards;
pub mod client;
pub mod http;
pub mod projects;
pub mod users;

pub use auth::Credentials;
pub use client::{ConnectionSettings, JiraClient};
