//! Request and response values exchanged between the pipeline stages.
//!
//! An `ApiRequest` is what an endpoint group asks for. The client resolves
//! it against its configuration into an `HttpRequest` (absolute URL, final
//! header set) which a `Transport` executes, producing a `ResponseEnvelope`.
//! All three are plain data so fake transports can record and answer them.

use std::time::Duration;

use reqwest::Method;
use serde_json::Value;

use crate::params::QueryParams;

/// Representation an endpoint asks the server for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// `application/json`, decoded into a `serde_json::Value`.
    #[default]
    Json,
    /// `text/csv`, returned as the raw body.
    Csv,
}

impl ResponseFormat {
    /// Value for the `Accept` header.
    pub fn accept_header(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "application/json",
            ResponseFormat::Csv => "text/csv",
        }
    }
}

/// One logical API call, before credentials and base URL are applied.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Always starts with `/`.
    pub path: String,
    pub query: QueryParams,
    pub body: Option<Value>,
    /// Credentials must be present; checked before any network I/O.
    pub requires_auth: bool,
    /// Overrides the client's default timeout for this call.
    pub timeout: Option<Duration>,
    pub accept: ResponseFormat,
}

impl ApiRequest {
    /// Build a request for `path`, adding the leading separator if missing.
    pub fn new(method: Method, path: &str) -> Self {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        Self {
            method,
            path,
            query: QueryParams::new(),
            body: None,
            requires_auth: false,
            timeout: None,
            accept: ResponseFormat::Json,
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: &str, body: Value) -> Self {
        let mut request = Self::new(Method::POST, path);
        request.body = Some(body);
        request
    }

    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    pub fn with_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_accept(mut self, accept: ResponseFormat) -> Self {
        self.accept = accept;
        self
    }
}

/// A fully resolved HTTP request, ready for a `Transport`.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL including the encoded query string.
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Serialized JSON body.
    pub body: Option<String>,
    /// Per-call timeout; the transport default applies when `None`.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// First header value matching `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Raw HTTP response as received by a `Transport`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
    /// URL the response was received from.
    pub url: String,
}

impl ResponseEnvelope {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
            url: String::new(),
        }
    }

    /// Envelope with `Content-Type: application/json`.
    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string()).with_header("content-type", "application/json")
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// First header value matching `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
