//! Jira Client
//!
//! One [`JiraClient`] is created per connection and passed by reference to
//! every scan and hydrate call. Cloning is cheap: the HTTP connection pool and
//! the hydrate gate are shared between clones.

use super::auth::Credentials;
use super::http::JiraHttpClient;
use crate::error::{ConnectorError, Result};
use crate::scan::{HydrateGate, DEFAULT_MAX_CONCURRENCY, DEFAULT_PAGE_SIZE};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Everything needed to reach one Jira site
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub base_url: Url,
    pub credentials: Credentials,
    pub page_size: usize,
    pub max_concurrency: usize,
    pub timeout: Option<Duration>,
}

impl ConnectionSettings {
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            ConnectorError::Connection(format!("invalid base URL '{}': {}", base_url, e))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConnectorError::Connection(format!(
                "unsupported URL scheme '{}'",
                base_url.scheme()
            )));
        }

        Ok(Self {
            base_url,
            credentials,
            page_size: DEFAULT_PAGE_SIZE,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            timeout: None,
        })
    }
}

/// Main Jira client
#[derive(Clone)]
pub struct JiraClient {
    http: JiraHttpClient,
    base_url: String,
    page_size: usize,
    gate: HydrateGate,
}

impl JiraClient {
    /// Create the client for one connection
    pub fn connect(settings: &ConnectionSettings) -> Result<Self> {
        let http = JiraHttpClient::new(settings.credentials.clone(), settings.timeout)?;

        tracing::info!(
            "Connecting to {} (page size {}, hydrate concurrency {})",
            settings.base_url,
            settings.page_size,
            settings.max_concurrency
        );

        Ok(Self {
            http,
            base_url: settings.base_url.as_str().trim_end_matches('/').to_string(),
            // larger pages come back short and would end a scan early
            page_size: settings.page_size.clamp(1, DEFAULT_PAGE_SIZE),
            gate: HydrateGate::new(settings.max_concurrency),
        })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn gate(&self) -> &HydrateGate {
        &self.gate
    }

    /// GET a Jira endpoint
    pub async fn get<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        self.http.get(url, query).await
    }

    /// GET a single resource; a 404 becomes `None`
    pub async fn get_optional<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        match self.http.get(url, query).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    // URL helpers
    // =========================================================================

    /// Build platform REST API URL (`/rest/api/2/...`)
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/rest/api/2/{}", self.base_url, path)
    }

    /// Build Jira Software (agile) REST API URL (`/rest/agile/1.0/...`)
    pub fn agile_url(&self, path: &str) -> String {
        format!("{}/rest/agile/1.0/{}", self.base_url, path)
    }
}
