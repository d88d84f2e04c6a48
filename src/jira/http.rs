//! HTTP utilities for Jira REST API calls

use super::auth::Credentials;
use crate::error::{ConnectorError, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut cut = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// HTTP client wrapper for Jira API calls
#[derive(Clone)]
pub struct JiraHttpClient {
    client: Client,
    credentials: Credentials,
}

impl JiraHttpClient {
    /// Create a new HTTP client
    pub fn new(credentials: Credentials, timeout: Option<Duration>) -> Result<Self> {
        let mut builder =
            Client::builder().user_agent(concat!("jira-tables/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            ConnectorError::Connection(format!("failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            credentials,
        })
    }

    /// GET a Jira endpoint and decode the JSON body into `T`
    pub async fn get<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        tracing::debug!("GET {} {:?}", url, query);

        let request = self
            .credentials
            .apply(self.client.get(url).query(query))
            .build()
            .map_err(|e| ConnectorError::transport(format!("failed to build request: {}", e)))?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| ConnectorError::transport(format!("failed to send request: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ConnectorError::transport(format!("failed to read response body: {}", e)))?;

        if status == StatusCode::NOT_FOUND {
            tracing::debug!("Not found: {} - {}", url, sanitize_for_log(&body));
            return Err(ConnectorError::NotFound(url.to_string()));
        }

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(ConnectorError::Transport {
                status: Some(status.as_u16()),
                message: "API request failed".to_string(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                "Failed to parse response from {}: {} - {}",
                url,
                e,
                sanitize_for_log(&body)
            );
            ConnectorError::Decode(e.to_string())
        })
    }
}
