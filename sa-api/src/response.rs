//! Response interpretation.
//!
//! Classifies a `ResponseEnvelope` by status and content type into a
//! `Payload` or exactly one `SaError`. Success bodies are returned as
//! received: JSON is decoded but not reshaped, text is not parsed.

use serde::de::DeserializeOwned;
use serde_json::Value;

use sa_core::constants::BODY_EXCERPT_CHARS;
use sa_core::error::{SaError, SaResult};

use crate::http::ResponseEnvelope;

/// A successful response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Decoded JSON document.
    Json(Value),
    /// Raw text, such as a CSV export.
    Text(String),
}

impl Payload {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(v) => Some(v),
            Payload::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(t) => Some(t),
            Payload::Json(_) => None,
        }
    }

    /// Typed view of a JSON payload.
    pub fn deserialize<T: DeserializeOwned>(&self) -> SaResult<T> {
        match self {
            Payload::Json(v) => Ok(serde_json::from_value(v.clone())?),
            Payload::Text(_) => Err(SaError::Serialization(
                "payload is text, not JSON".to_string(),
            )),
        }
    }
}

/// Interpret an envelope into a payload or a typed error.
pub fn interpret(envelope: ResponseEnvelope) -> SaResult<Payload> {
    if envelope.is_success() {
        return interpret_success(envelope);
    }

    let status = envelope.status;
    let message = error_message(&envelope.body)
        .unwrap_or_else(|| fallback_message(status, &envelope.body));
    let body = excerpt(&envelope.body);

    let err = match status {
        401 | 403 => SaError::Authentication {
            message,
            status: Some(status),
            body,
        },
        404 => {
            let message = match resource_from_url(&envelope.url) {
                Some(resource) => format!("{message} (resource: {resource})"),
                None => message,
            };
            SaError::NotFound {
                message,
                status,
                body,
            }
        }
        429 => SaError::RateLimit {
            message,
            status,
            retry_after: envelope.header("retry-after").map(str::to_string),
            body,
        },
        400 | 422 => SaError::Validation {
            message: if error_message(&envelope.body).is_some() {
                message
            } else {
                "request parameters were rejected".to_string()
            },
            status,
            body,
        },
        s if s >= 500 => SaError::Server {
            message,
            status,
            body,
        },
        _ => SaError::Api {
            message,
            status,
            body,
        },
    };
    Err(err)
}

fn interpret_success(envelope: ResponseEnvelope) -> SaResult<Payload> {
    if !is_json_content_type(envelope.content_type()) {
        return Ok(Payload::Text(envelope.body));
    }

    serde_json::from_str(&envelope.body)
        .map(Payload::Json)
        .map_err(|e| SaError::Server {
            message: format!("invalid response body: {e}"),
            status: envelope.status,
            body: excerpt(&envelope.body),
        })
}

/// Error for a success response whose representation the caller cannot use.
pub fn unexpected_representation(status: u16, expected: &str, payload: &Payload) -> SaError {
    let (received, body) = match payload {
        Payload::Json(v) => ("JSON", v.to_string()),
        Payload::Text(t) => ("text", t.clone()),
    };
    SaError::Server {
        message: format!("expected a {expected} response but received {received}"),
        status,
        body: excerpt(&body),
    }
}

fn is_json_content_type(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
        .is_some_and(|mime| mime == "application/json" || mime.ends_with("+json") || mime == "text/json")
}

/// Pull the conventional `error` or `message` field out of a JSON body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let field = value.get("error").or_else(|| value.get("message"))?;
    match field {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(obj) => obj
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

fn fallback_message(status: u16, body: &str) -> String {
    match excerpt(body) {
        Some(text) => text,
        None => format!("HTTP {status}"),
    }
}

/// Truncated body, or `None` for an empty body.
pub(crate) fn excerpt(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut chars = trimmed.chars();
    let head: String = chars.by_ref().take(BODY_EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        Some(format!("{head}..."))
    } else {
        Some(head)
    }
}

/// Resource named by a request URL: `/example.com.json` -> `example.com`.
fn resource_from_url(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let path = parsed.path().trim_matches('/');
    let resource = path.strip_suffix(".json").unwrap_or(path);
    if resource.is_empty() {
        None
    } else {
        Some(resource.to_string())
    }
}
