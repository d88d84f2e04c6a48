//! Connector errors
//!
//! Every fallible operation in the library returns [`ConnectorError`]. The
//! binary wraps these in `anyhow` and uses [`ConnectorError::hint`] for display.

use thiserror::Error;

pub type Result<T, E = ConnectorError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The client could not be created (missing URL, credentials, bad TLS setup).
    #[error("connection error: {0}")]
    Connection(String),

    /// The request could not be built or sent, or the API answered with a
    /// non-success status.
    #[error("transport error{}: {message}", status_suffix(.status))]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// The API answered 404 for the requested resource.
    #[error("not found: {0}")]
    NotFound(String),

    /// The response body was not the JSON shape we expected.
    #[error("decode error: {0}")]
    Decode(String),

    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("unknown column {column} in {table}")]
    UnknownColumn { table: String, column: String },

    #[error("invalid key for {table}: {message}")]
    InvalidKey { table: String, message: String },
}

impl ConnectorError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            Self::NotFound(_) => Some(404),
            _ => None,
        }
    }

    /// Short, user-facing explanation of the failure.
    /// Raw API messages are never echoed back; they go to the log instead.
    pub fn hint(&self) -> String {
        match (self, self.status()) {
            (_, Some(401)) => "Authentication failed. Check the username and API token.".to_string(),
            (_, Some(403)) => "Permission denied. The account cannot browse this resource.".to_string(),
            (_, Some(404)) => "Resource not found.".to_string(),
            (_, Some(429)) => "Rate limit exceeded. Please try again later.".to_string(),
            (_, Some(400)) => "Invalid request. Check your parameters.".to_string(),
            (_, Some(s)) if s >= 500 => "Jira is temporarily unavailable. Please try again.".to_string(),
            (Self::Connection(msg), _) => format!("Cannot connect to Jira: {}", msg),
            (Self::Transport { .. }, _) => {
                "Request failed. Check your network connection and try again.".to_string()
            }
            (Self::Decode(_), _) => "Unexpected response from Jira.".to_string(),
            (other, _) => other.to_string(),
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

impl From<serde_json::Error> for ConnectorError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_display_includes_status() {
        let err = ConnectorError::Transport {
            status: Some(503),
            message: "API request failed".to_string(),
        };
        assert_eq!(err.to_string(), "transport error (503): API request failed");

        let err = ConnectorError::transport("connection reset");
        assert_eq!(err.to_string(), "transport error: connection reset");
    }

    #[test]
    fn test_hint_maps_statuses() {
        let status = |s| ConnectorError::Transport {
            status: Some(s),
            message: String::new(),
        };
        assert!(status(401).hint().contains("Authentication"));
        assert!(status(403).hint().contains("Permission"));
        assert!(status(429).hint().contains("Rate limit"));
        assert!(status(502).hint().contains("unavailable"));
        assert_eq!(
            ConnectorError::NotFound("board 7".into()).hint(),
            "Resource not found."
        );
    }

    #[test]
    fn test_hint_does_not_leak_decode_details() {
        let err = ConnectorError::Decode("expected `,` at line 1 column 88".into());
        assert_eq!(err.hint(), "Unexpected response from Jira.");
    }
}
