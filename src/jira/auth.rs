//! Jira Authentication
//!
//! Jira Cloud accepts basic auth with an account email and API token.
//! Jira Server / Data Center also accepts personal access tokens sent as
//! bearer tokens.

use reqwest::RequestBuilder;
use std::fmt;

/// Credentials attached to every request
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Username (or account email) and API token
    Basic { username: String, token: String },
    /// Personal access token
    Bearer(String),
}

impl Credentials {
    /// Pick credentials from the configured values.
    /// A personal access token wins over username/token.
    pub fn resolve(
        username: Option<&str>,
        token: Option<&str>,
        personal_access_token: Option<&str>,
    ) -> Option<Self> {
        if let Some(pat) = personal_access_token.filter(|t| !t.is_empty()) {
            return Some(Self::Bearer(pat.to_string()));
        }

        match (username, token) {
            (Some(user), Some(token)) if !user.is_empty() && !token.is_empty() => {
                Some(Self::Basic {
                    username: user.to_string(),
                    token: token.to_string(),
                })
            }
            _ => None,
        }
    }

    /// Attach the credentials to a request
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Basic { username, token } => request.basic_auth(username, Some(token)),
            Self::Bearer(token) => request.bearer_auth(token),
        }
    }
}

// Security: never print secrets, even in debug logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("token", &"***")
                .finish(),
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"***").finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_personal_access_token_wins() {
        let creds = Credentials::resolve(Some("me@example.com"), Some("api-token"), Some("pat"));
        assert_eq!(creds, Some(Credentials::Bearer("pat".to_string())));
    }

    #[test]
    fn test_basic_requires_both_parts() {
        assert!(Credentials::resolve(Some("me@example.com"), None, None).is_none());
        assert!(Credentials::resolve(None, Some("api-token"), None).is_none());
        assert!(Credentials::resolve(Some(""), Some("api-token"), Some("")).is_none());

        let creds = Credentials::resolve(Some("me@example.com"), Some("api-token"), None);
        assert!(matches!(creds, Some(Credentials::Basic { .. })));
    }

    #[test]
    fn test_debug_masks_secrets() {
        let creds = Credentials::Basic {
            username: "me@example.com".to_string(),
            token: "super-secret".to_string(),
        };
        let printed = format!("{:?}", creds);
        assert!(printed.contains("me@example.com"));
        assert!(!printed.contains("super-secret"));

        let printed = format!("{:?}", Credentials::Bearer("pat-secret".to_string()));
        assert!(!printed.contains("pat-secret"));
    }
}
