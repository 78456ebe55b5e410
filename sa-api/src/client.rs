//! Client entry point for the Simple Analytics API.
//!
//! A `Client` owns one transport and shares it with the Stats, Export and
//! Admin endpoint groups. Every call flows through the same pipeline:
//! credential resolution, URL and header assembly, one transport round trip,
//! and response interpretation. Errors are masked so that configured
//! credentials never appear in messages.
//!
//! Releasing the transport is tied to the client's scope: `close`, `scope`
//! and `Drop` all release it, exactly once. A closed client rejects further
//! calls with `SaError::Closed`; build a new client to reconnect.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use sa_core::config::AppConfig;
use sa_core::constants;
use sa_core::error::{SaError, SaResult};

use crate::credentials::Credentials;
use crate::endpoints::admin::AdminApi;
use crate::endpoints::export::ExportApi;
use crate::endpoints::stats::StatsApi;
use crate::http::{ApiRequest, HttpRequest, ResponseEnvelope};
use crate::response::{self, Payload};
use crate::transport::{HttpTransport, Transport};

/// Immutable client configuration. `Debug` output masks credentials.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    credentials: Credentials,
    base_url: String,
    timeout: Duration,
    user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            base_url: constants::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(constants::DEFAULT_TIMEOUT_SECS),
            user_agent: constants::default_user_agent(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration with both credentials set.
    pub fn with_credentials(api_key: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(Some(api_key.into()), Some(user_id.into())),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.credentials = Credentials::new(
            Some(api_key.into()),
            self.credentials.user_id().map(str::to_string),
        );
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.credentials = Credentials::new(
            self.credentials.api_key().map(str::to_string),
            Some(user_id.into()),
        );
        self
    }

    /// API origin. Trailing slashes are removed.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim().trim_end_matches('/').to_string();
        self
    }

    /// Default bound for each round trip.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Resolve a collaborator's `AppConfig` into client settings.
    pub fn from_app_config(config: &AppConfig) -> Self {
        let mut client_config = Self {
            credentials: Credentials::new(
                config.credentials.api_key.clone(),
                config.credentials.user_id.clone(),
            ),
            ..Self::default()
        }
        .with_base_url(AppConfig::sanitize_base_url(&config.server.base_url))
        .with_timeout(Duration::from_secs(config.server.timeout_secs));

        if let Some(agent) = &config.server.user_agent {
            client_config = client_config.with_user_agent(agent.as_str());
        }
        client_config
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn validate(&self) -> SaResult<()> {
        let url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| SaError::Config(format!("invalid base URL '{}': {e}", self.base_url)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(SaError::Config(format!(
                "base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(SaError::Config(
                "base URL must not carry a query or fragment".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(SaError::Config("timeout must be greater than zero".to_string()));
        }
        Ok(())
    }
}

/// Request pipeline shared by the endpoint groups of one client.
pub(crate) struct Pipeline {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    closed: AtomicBool,
}

impl Pipeline {
    /// Dispatch a request whose endpoint answers with JSON.
    pub(crate) fn send_json(&self, request: ApiRequest) -> SaResult<Value> {
        self.send_expecting(request, "JSON", |payload| match payload {
            Payload::Json(value) => Ok(value),
            other => Err(other),
        })
    }

    /// Dispatch a request whose endpoint answers with raw text.
    pub(crate) fn send_text(&self, request: ApiRequest) -> SaResult<String> {
        self.send_expecting(request, "text", |payload| match payload {
            Payload::Text(text) => Ok(text),
            other => Err(other),
        })
    }

    fn send_expecting<T, F>(&self, request: ApiRequest, expected: &str, pick: F) -> SaResult<T>
    where
        F: FnOnce(Payload) -> Result<T, Payload>,
    {
        let result = self.execute(&request).and_then(|envelope| {
            let status = envelope.status;
            let payload = response::interpret(envelope)?;
            pick(payload)
                .map_err(|other| response::unexpected_representation(status, expected, &other))
        });
        result.map_err(|e| self.config.credentials.redact_error(e))
    }

    /// Resolve credentials and URL, then perform one transport round trip.
    fn execute(&self, request: &ApiRequest) -> SaResult<ResponseEnvelope> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SaError::Closed);
        }

        let mut headers = self.config.credentials.resolve(request.requires_auth)?;
        headers.push(("Accept".to_string(), request.accept.accept_header().to_string()));
        headers.push(("User-Agent".to_string(), self.config.user_agent.clone()));

        let body = match &request.body {
            Some(value) => {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
                Some(serde_json::to_string(value)?)
            }
            None => None,
        };

        let http = HttpRequest {
            method: request.method.clone(),
            url: self.url(request)?,
            headers,
            body,
            timeout: request.timeout,
        };

        debug!("{} {}", request.method, request.path);
        let envelope = self.transport.execute(&http)?;

        match envelope.status {
            429 => warn!("{} {} rate limited", request.method, request.path),
            s if s >= 500 => warn!("{} {} returned {s}", request.method, request.path),
            s => debug!("{} {} returned {s}", request.method, request.path),
        }
        Ok(envelope)
    }

    /// Absolute URL for `request` with its encoded query string.
    fn url(&self, request: &ApiRequest) -> SaResult<String> {
        let raw = format!("{}{}", self.config.base_url, request.path);
        let mut url = reqwest::Url::parse(&raw)
            .map_err(|e| SaError::Config(format!("invalid request URL: {e}")))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url.to_string())
    }

    /// Release the transport. Returns false if it was already released.
    fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.transport.close();
        true
    }
}

/// Client for the Simple Analytics Stats, Export and Admin APIs.
///
/// ```rust,ignore
/// let client = Client::new(ClientConfig::with_credentials(key, user))?;
/// let stats = client.stats().get(&StatsQuery::new("example.com"))?;
/// ```
pub struct Client {
    pipeline: Arc<Pipeline>,
    stats: StatsApi,
    export: ExportApi,
    admin: AdminApi,
}

impl Client {
    /// Create a client backed by the blocking HTTP transport.
    pub fn new(config: ClientConfig) -> SaResult<Self> {
        config.validate()?;
        let transport = HttpTransport::new(config.timeout)?;
        Ok(Self::assemble(config, Arc::new(transport)))
    }

    /// Create a client over a caller-supplied transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> SaResult<Self> {
        config.validate()?;
        Ok(Self::assemble(config, transport))
    }

    /// Wire the endpoint groups to one pipeline. `config` is already valid.
    fn assemble(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        debug!("client created for {}", config.base_url);

        let pipeline = Arc::new(Pipeline {
            config,
            transport,
            closed: AtomicBool::new(false),
        });

        Self {
            stats: StatsApi::new(Arc::clone(&pipeline)),
            export: ExportApi::new(Arc::clone(&pipeline)),
            admin: AdminApi::new(Arc::clone(&pipeline)),
            pipeline,
        }
    }

    /// Run `f` with this client, then release the transport whether `f`
    /// succeeded, failed, or panicked.
    pub fn scope<T, F>(self, f: F) -> SaResult<T>
    where
        F: FnOnce(&Client) -> SaResult<T>,
    {
        let result = f(&self);
        self.close();
        result
    }

    /// Aggregated statistics.
    pub fn stats(&self) -> &StatsApi {
        &self.stats
    }

    /// Raw data point export. Requires credentials.
    pub fn export(&self) -> &ExportApi {
        &self.export
    }

    /// Website administration. Requires credentials.
    pub fn admin(&self) -> &AdminApi {
        &self.admin
    }

    pub fn config(&self) -> &ClientConfig {
        &self.pipeline.config
    }

    /// Release the transport. Later calls fail with `SaError::Closed`.
    pub fn close(&self) {
        if self.pipeline.close() {
            debug!("client closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.pipeline.closed.load(Ordering::Acquire)
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.pipeline.config)
            .field("closed", &self.is_closed())
            .finish()
    }
}
