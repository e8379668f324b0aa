//! Errors of calls to the identity provider.
//!
//! A rejected credential (401/403) has to stay distinguishable from an
//! unreachable provider, so the status code travels with the error.
//!
//! ```
//! use integra_core::http::HttpError;
//!
//! let err = HttpError::status(403, "token revoked");
//! assert!(err.is_rejection());
//! assert!(!err.is_retriable());
//! ```

/// Failure of a single HTTP exchange.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// Non-success response
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Connection, DNS or TLS failure before any response arrived
    #[error("Transport error: {0}")]
    Transport(reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    /// Response body is not the expected JSON document
    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::status(status.as_u16(), err.to_string()),
            None if err.is_timeout() => Self::Timeout,
            None if err.is_decode() => Self::Decode(err.to_string()),
            None => Self::Transport(err),
        }
    }
}

impl HttpError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Timeout | Self::Decode(_) => None,
        }
    }

    /// The provider refused the credential (401 or 403)
    pub fn is_rejection(&self) -> bool {
        matches!(self.status_code(), Some(401 | 403))
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self.status_code(), Some(500..=599))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    /// Worth another attempt: server errors, timeouts and transport failures.
    /// A body that did not parse will not parse on the next attempt either.
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Status { .. } => self.is_server_error(),
            Self::Transport(e) => e.is_connect() || e.is_request() || e.is_timeout(),
            Self::Timeout => true,
            Self::Decode(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_statuses() {
        assert!(HttpError::status(401, "expired").is_rejection());
        assert!(HttpError::status(403, "revoked").is_rejection());
        assert!(!HttpError::status(404, "no such route").is_rejection());
        assert!(!HttpError::Timeout.is_rejection());
    }

    #[test]
    fn test_only_transient_failures_are_retriable() {
        assert!(HttpError::status(503, "maintenance").is_retriable());
        assert!(HttpError::Timeout.is_retriable());
        assert!(!HttpError::status(401, "expired").is_retriable());
        assert!(!HttpError::status(422, "bad input").is_retriable());
        assert!(!HttpError::Decode("expected value".into()).is_retriable());
    }

    #[test]
    fn test_display_keeps_status_and_message() {
        let err = HttpError::status(502, "upstream down");
        assert_eq!(err.to_string(), "HTTP 502: upstream down");
        assert_eq!(err.status_code(), Some(502));
        assert_eq!(HttpError::Decode("x".into()).status_code(), None);
    }
}
