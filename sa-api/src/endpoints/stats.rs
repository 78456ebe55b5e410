//! Stats API: aggregated statistics per website or page.
//!
//! Works for public websites without credentials. Configured credentials are
//! still attached so private websites can be queried.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use sa_core::error::SaResult;

use crate::client::Pipeline;
use crate::http::ApiRequest;
use crate::params::StatsQuery;
use crate::types::Interval;

/// Inputs of a histogram query.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramQuery {
    pub hostname: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub interval: Interval,
    pub timezone: Option<String>,
    pub timeout: Option<Duration>,
}

impl HistogramQuery {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            start: None,
            end: None,
            interval: Interval::default(),
            timezone: None,
            timeout: None,
        }
    }

    pub fn start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }

    pub fn interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }

    pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn to_stats_query(&self) -> StatsQuery {
        let mut query = StatsQuery::new(self.hostname.as_str())
            .fields(["histogram"])
            .interval(self.interval);
        query.start = self.start.clone();
        query.end = self.end.clone();
        query.timezone = self.timezone.clone();
        query.timeout = self.timeout;
        query
    }
}

/// Inputs of an events query.
#[derive(Debug, Clone, PartialEq)]
pub struct EventsQuery {
    pub hostname: String,
    /// Event names; `*` selects every event.
    pub events: Vec<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub timezone: Option<String>,
    pub timeout: Option<Duration>,
}

impl EventsQuery {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            events: vec!["*".to_string()],
            start: None,
            end: None,
            timezone: None,
            timeout: None,
        }
    }

    pub fn events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.events = events.into_iter().map(Into::into).collect();
        self
    }

    pub fn start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }

    pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn to_stats_query(&self) -> StatsQuery {
        let mut query = StatsQuery::new(self.hostname.as_str()).events(self.events.iter().cloned());
        query.start = self.start.clone();
        query.end = self.end.clone();
        query.timezone = self.timezone.clone();
        query.timeout = self.timeout;
        query
    }
}

/// Stats endpoint group.
#[derive(Clone)]
pub struct StatsApi {
    pipeline: Arc<Pipeline>,
}

impl StatsApi {
    pub(crate) fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    /// Fetch statistics for a website, or one page of it when `path` is set.
    /// The JSON is returned as received.
    pub fn get(&self, query: &StatsQuery) -> SaResult<Value> {
        let request = ApiRequest::get(&query.endpoint())
            .with_query(query.encode())
            .with_timeout(query.timeout);
        self.pipeline.send_json(request)
    }

    /// Pageviews and visitors over time (`fields=histogram`).
    pub fn get_histogram(&self, query: &HistogramQuery) -> SaResult<Value> {
        self.get(&query.to_stats_query())
    }

    /// Event counts, all events by default.
    pub fn get_events(&self, query: &EventsQuery) -> SaResult<Value> {
        self.get(&query.to_stats_query())
    }
}
