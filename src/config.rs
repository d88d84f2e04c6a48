//! Configuration Management
//!
//! Connection settings come from, in order of precedence: command-line flags,
//! environment variables, the config file, built-in defaults.

use crate::error::{ConnectorError, Result};
use crate::jira::{ConnectionSettings, Credentials};
use crate::scan::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_URL: &str = "JIRA_URL";
pub const ENV_USER: &str = "JIRA_USER";
pub const ENV_TOKEN: &str = "JIRA_TOKEN";
pub const ENV_PERSONAL_ACCESS_TOKEN: &str = "JIRA_PERSONAL_ACCESS_TOKEN";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Site URL, e.g. https://your-domain.atlassian.net
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Account email (Cloud) or username (Server)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// API token used with `username`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Personal access token (Server / Data Center); takes precedence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    /// Concurrent hydrate calls per connection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Get the config file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("jira-tables").join("config.json"))
    }

    /// Load configuration from disk; a missing or unreadable file gives defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Cannot read config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        // Security: the file may hold API tokens
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Overlay values from the process environment
    pub fn with_env(self) -> Self {
        self.overlay_env(|key| std::env::var(key).ok())
    }

    /// Overlay values from an environment lookup; set variables win
    pub fn overlay_env(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env = Config {
            base_url: lookup(ENV_URL),
            username: lookup(ENV_USER),
            token: lookup(ENV_TOKEN),
            personal_access_token: lookup(ENV_PERSONAL_ACCESS_TOKEN),
            ..Default::default()
        };
        self.merge(env)
    }

    /// Values set in `other` win over values in `self`
    pub fn merge(self, other: Config) -> Self {
        fn pick<T>(base: Option<T>, over: Option<T>) -> Option<T> {
            over.or(base)
        }

        Self {
            base_url: pick(self.base_url, other.base_url.filter(|s| !s.is_empty())),
            username: pick(self.username, other.username.filter(|s| !s.is_empty())),
            token: pick(self.token, other.token.filter(|s| !s.is_empty())),
            personal_access_token: pick(
                self.personal_access_token,
                other.personal_access_token.filter(|s| !s.is_empty()),
            ),
            page_size: pick(self.page_size, other.page_size),
            max_concurrency: pick(self.max_concurrency, other.max_concurrency),
            timeout_secs: pick(self.timeout_secs, other.timeout_secs),
        }
    }

    /// Resolve into the settings needed to connect
    pub fn connection_settings(&self) -> Result<ConnectionSettings> {
        let base_url = self.base_url.as_deref().ok_or_else(|| {
            ConnectorError::Connection(format!(
                "no Jira URL configured. Set {} or use --url",
                ENV_URL
            ))
        })?;

        let credentials = Credentials::resolve(
            self.username.as_deref(),
            self.token.as_deref(),
            self.personal_access_token.as_deref(),
        )
        .ok_or_else(|| {
            ConnectorError::Connection(format!(
                "no credentials configured. Set {} and {}, or {}",
                ENV_USER, ENV_TOKEN, ENV_PERSONAL_ACCESS_TOKEN
            ))
        })?;

        let mut settings = ConnectionSettings::new(base_url, credentials)?;
        if let Some(page_size) = self.page_size {
            settings.page_size = page_size.clamp(1, DEFAULT_PAGE_SIZE);
        }
        if let Some(max_concurrency) = self.max_concurrency {
            settings.max_concurrency = max_concurrency.max(1);
        }
        settings.timeout = self.timeout_secs.map(Duration::from_secs);

        Ok(settings)
    }
}
