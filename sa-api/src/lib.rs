//! Simple Analytics API - blocking HTTP client for the Stats, Export and
//! Admin APIs.
//!
//! One [`Client`] owns a pooled connection context shared by its three
//! endpoint groups. Each call performs at most one network attempt: the
//! credential check runs first, the response is classified into a payload
//! or exactly one [`SaError`], and nothing is retried behind the caller's
//! back. Credential values are masked in every error the client returns.

pub mod client;
pub mod credentials;
pub mod endpoints;
pub mod http;
pub mod params;
pub mod response;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod transport;
pub mod types;

// Re-export key types
pub use client::{Client, ClientConfig};
pub use credentials::Credentials;
pub use endpoints::admin::{AdminApi, NewWebsite};
pub use endpoints::export::ExportApi;
pub use endpoints::stats::{EventsQuery, HistogramQuery, StatsApi};
pub use http::{ApiRequest, HttpRequest, ResponseEnvelope, ResponseFormat};
pub use params::{ExportQuery, QueryParams, StatsQuery};
pub use response::Payload;
#[cfg(any(test, feature = "testing"))]
pub use testing::RecordingTransport;
pub use transport::{HttpTransport, Transport};
pub use types::{DataType, ExportFormat, HistogramEntry, Interval, PageStats, WebsiteInfo};

pub use sa_core::error::{NetworkErrorKind, SaError, SaResult};
