//! HTTP transport.
//!
//! A `Transport` performs exactly one network attempt per `execute` call and
//! hands back any HTTP status it receives. Connection failures and timeouts
//! are the only errors it raises itself; status classification belongs to
//! the response interpreter. There is no retry at this layer.

use std::sync::Mutex;
use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use tracing::debug;

use sa_core::error::{NetworkErrorKind, SaError, SaResult};

use crate::http::{HttpRequest, ResponseEnvelope};

/// Executes resolved requests. Implementations must be shareable across
/// the endpoint groups of one client.
pub trait Transport: Send + Sync {
    /// Perform one round trip.
    fn execute(&self, request: &HttpRequest) -> SaResult<ResponseEnvelope>;

    /// Release connection resources. Called at most once by the client.
    fn close(&self);
}

/// Blocking reqwest transport with a pooled connection context.
pub struct HttpTransport {
    inner: Mutex<Option<HttpClient>>,
    timeout: Duration,
}

impl HttpTransport {
    /// Build the connection pool. `timeout` bounds each whole round trip
    /// unless a request carries its own. Redirects are not followed: a 3xx
    /// is returned as-is so credentials never leave the configured host.
    pub fn new(timeout: Duration) -> SaResult<Self> {
        let inner = HttpClient::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .connect_timeout(timeout)
            .pool_max_idle_per_host(5)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(|e| SaError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner: Mutex::new(Some(inner)),
            timeout,
        })
    }

    /// Default round-trip bound.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Handle to the pool, or `Closed` once released. reqwest clients are
    /// reference counted, so the lock is not held during I/O.
    fn handle(&self) -> SaResult<HttpClient> {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.clone().ok_or(SaError::Closed)
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &HttpRequest) -> SaResult<ResponseEnvelope> {
        let client = self.handle()?;

        let mut builder = client.request(request.method.clone(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().map_err(classify_error)?;

        let status = response.status().as_u16();
        let url = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        // The timeout covers the body as well; a slow body is still a timeout.
        let body = response.text().map_err(classify_error)?;

        Ok(ResponseEnvelope {
            status,
            headers,
            body,
            url,
        })
    }

    fn close(&self) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if guard.take().is_some() {
            debug!("HTTP connection pool released");
        }
    }
}

/// Classify a reqwest error into a network error kind.
fn classify_error(e: reqwest::Error) -> SaError {
    // reqwest's Display includes the URL; strip it, query strings included.
    let e = e.without_url();
    if e.is_timeout() {
        SaError::network(NetworkErrorKind::Timeout, format!("request timed out: {e}"))
    } else if e.is_connect() {
        SaError::network(NetworkErrorKind::Connect, format!("connection failed: {e}"))
    } else {
        SaError::network(NetworkErrorKind::Other, format!("request failed: {e}"))
    }
}
