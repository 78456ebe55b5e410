//! Error types for the Simple Analytics client.
//!
//! Every failure in the request pipeline surfaces as exactly one `SaError`
//! variant, raised where it is detected: the credential check, the transport,
//! or response interpretation. Classification is driven by status codes and
//! transport error kinds, never by inspecting message text.

use std::borrow::Cow;
use std::time::Duration;

use thiserror::Error;

/// Convenience type alias for Results using SaError.
pub type SaResult<T> = Result<T, SaError>;

/// Failure below the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    /// DNS failure, connection refused or reset.
    Connect,
    /// No complete response within the configured bound.
    Timeout,
    /// TLS, protocol or body-read failures.
    Other,
}

/// Unified error type for the client and its collaborators.
#[derive(Error, Debug)]
pub enum SaError {
    // -- API taxonomy --
    /// Credentials missing before dispatch, or rejected with 401/403.
    #[error("authentication error: {message}")]
    Authentication {
        message: String,
        /// Absent when raised before any request was sent.
        status: Option<u16>,
        body: Option<String>,
    },

    /// The server returned 404.
    #[error("not found: {message}")]
    NotFound {
        message: String,
        status: u16,
        body: Option<String>,
    },

    /// The server returned 429.
    #[error("rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        status: u16,
        /// Raw `Retry-After` header value, if the server sent one.
        retry_after: Option<String>,
        body: Option<String>,
    },

    /// The server rejected the request parameters (400/422).
    #[error("validation error: {message}")]
    Validation {
        message: String,
        status: u16,
        body: Option<String>,
    },

    /// 5xx, or a 2xx whose body could not be decoded.
    #[error("server error (status {status}): {message}")]
    Server {
        message: String,
        status: u16,
        body: Option<String>,
    },

    /// Connection failure or timeout; no HTTP status was received.
    #[error("network error: {message}")]
    Network {
        kind: NetworkErrorKind,
        message: String,
    },

    /// Any other non-2xx status.
    #[error("api error (status {status}): {message}")]
    Api {
        message: String,
        status: u16,
        body: Option<String>,
    },

    // -- Lifecycle --
    /// The client's connection context has already been released.
    #[error("client is closed; create a new client to issue further requests")]
    Closed,

    // -- Configuration / IO --
    /// Invalid or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error outside response interpretation.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl SaError {
    /// Shorthand for a pre-dispatch authentication failure.
    pub fn missing_credential(message: impl Into<String>) -> Self {
        SaError::Authentication {
            message: message.into(),
            status: None,
            body: None,
        }
    }

    /// Shorthand for a network failure.
    pub fn network(kind: NetworkErrorKind, message: impl Into<String>) -> Self {
        SaError::Network {
            kind,
            message: message.into(),
        }
    }

    /// Human-readable message without the category prefix.
    pub fn message(&self) -> Cow<'_, str> {
        match self {
            SaError::Authentication { message, .. }
            | SaError::NotFound { message, .. }
            | SaError::RateLimit { message, .. }
            | SaError::Validation { message, .. }
            | SaError::Server { message, .. }
            | SaError::Network { message, .. }
            | SaError::Api { message, .. } => Cow::Borrowed(message),
            SaError::Config(message) | SaError::Serialization(message) => Cow::Borrowed(message),
            other => Cow::Owned(other.to_string()),
        }
    }

    /// HTTP status that produced this error, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            SaError::Authentication { status, .. } => *status,
            SaError::NotFound { status, .. }
            | SaError::RateLimit { status, .. }
            | SaError::Validation { status, .. }
            | SaError::Server { status, .. }
            | SaError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Excerpt of the response body, if one was received.
    pub fn body(&self) -> Option<&str> {
        match self {
            SaError::Authentication { body, .. }
            | SaError::NotFound { body, .. }
            | SaError::RateLimit { body, .. }
            | SaError::Validation { body, .. }
            | SaError::Server { body, .. }
            | SaError::Api { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    /// Server-suggested wait before retrying, when given in whole seconds.
    ///
    /// HTTP-date values are kept verbatim in the `retry_after` field but are
    /// not interpreted here.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            SaError::RateLimit {
                retry_after: Some(value),
                ..
            } => value.trim().parse::<u64>().ok().map(Duration::from_secs),
            _ => None,
        }
    }

    /// Whether a caller-side retry could plausibly succeed.
    ///
    /// The client itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SaError::RateLimit { .. } | SaError::Network { .. } | SaError::Server { .. }
        )
    }

    /// Rewrite every free-text field (message and body) with `f`.
    pub fn map_text<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> String,
    {
        let body_of = |body: Option<String>| body.map(|b| f(&b));
        match self {
            SaError::Authentication { message, status, body } => SaError::Authentication {
                message: f(&message),
                status,
                body: body_of(body),
            },
            SaError::NotFound { message, status, body } => SaError::NotFound {
                message: f(&message),
                status,
                body: body_of(body),
            },
            SaError::RateLimit {
                message,
                status,
                retry_after,
                body,
            } => SaError::RateLimit {
                message: f(&message),
                status,
                retry_after,
                body: body_of(body),
            },
            SaError::Validation { message, status, body } => SaError::Validation {
                message: f(&message),
                status,
                body: body_of(body),
            },
            SaError::Server { message, status, body } => SaError::Server {
                message: f(&message),
                status,
                body: body_of(body),
            },
            SaError::Network { kind, message } => SaError::Network {
                kind,
                message: f(&message),
            },
            SaError::Api { message, status, body } => SaError::Api {
                message: f(&message),
                status,
                body: body_of(body),
            },
            SaError::Config(message) => SaError::Config(f(&message)),
            SaError::Serialization(message) => SaError::Serialization(f(&message)),
            other => other,
        }
    }
}

impl From<serde_json::Error> for SaError {
    fn from(e: serde_json::Error) -> Self {
        SaError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for SaError {
    fn from(e: toml::de::Error) -> Self {
        SaError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_category() {
        let err = SaError::Config("bad value".to_string());
        assert_eq!(err.to_string(), "configuration error: bad value");

        let err = SaError::Server {
            message: "boom".into(),
            status: 503,
            body: None,
        };
        assert_eq!(err.to_string(), "server error (status 503): boom");
    }

    #[test]
    fn test_accessors() {
        let err = SaError::Validation {
            message: "Invalid date format".into(),
            status: 422,
            body: Some("{\"error\":\"Invalid date format\"}".into()),
        };
        assert_eq!(err.message(), "Invalid date format");
        assert_eq!(err.status(), Some(422));
        assert!(err.body().unwrap().contains("Invalid date"));

        let err = SaError::missing_credential("API key is required for this operation");
        assert_eq!(err.status(), None);
        assert!(err.body().is_none());
    }

    #[test]
    fn test_retry_after_seconds() {
        let err = SaError::RateLimit {
            message: "slow down".into(),
            status: 429,
            retry_after: Some(" 30 ".into()),
            body: None,
        };
        assert_eq!(err.retry_after(), Some(Duration::from_secs(30)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_retry_after_http_date_not_interpreted() {
        let err = SaError::RateLimit {
            message: "slow down".into(),
            status: 429,
            retry_after: Some("Wed, 21 Oct 2015 07:28:00 GMT".into()),
            body: None,
        };
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn test_retryable_classification() {
        assert!(SaError::network(NetworkErrorKind::Timeout, "t").is_retryable());
        assert!(!SaError::missing_credential("x").is_retryable());
        assert!(!SaError::Closed.is_retryable());
    }

    #[test]
    fn test_map_text_rewrites_message_and_body() {
        let err = SaError::Api {
            message: "secret leaked".into(),
            status: 418,
            body: Some("secret body".into()),
        };
        let err = err.map_text(|s| s.replace("secret", "****"));
        assert_eq!(err.message(), "**** leaked");
        assert_eq!(err.body(), Some("**** body"));
        assert_eq!(err.status(), Some(418));
    }
}
