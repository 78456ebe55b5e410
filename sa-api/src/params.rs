//! Query parameter encoding.
//!
//! Turns the structured inputs of Stats and Export calls into an ordered
//! query mapping. The encoder only transforms structure: it never validates
//! ranges, never drops unknown filter keys, and never deduplicates list
//! entries. Empty and absent values are left out.

use std::collections::BTreeMap;
use std::time::Duration;

use sa_core::constants::API_VERSION;

use crate::types::{DataType, ExportFormat, Interval};

/// Ordered query mapping with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`. An existing key keeps its position and takes
    /// the new value. Empty values are ignored.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        if value.is_empty() {
            return self;
        }
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((key.to_string(), value)),
        }
        self
    }

    /// Set `key` when `value` is present.
    pub fn set_opt<V: ToString>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            self.set(key, v.to_string());
        }
        self
    }

    /// Comma-join `values` in the order given. An empty list is omitted.
    pub fn set_list<S: AsRef<str>>(&mut self, key: &str, values: &[S]) -> &mut Self {
        if !values.is_empty() {
            let joined = values
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(",");
            self.set(key, joined);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Inputs of a Stats API call.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsQuery {
    pub hostname: String,
    /// Page path; stats are site-wide when absent.
    pub path: Option<String>,
    /// `YYYY-MM-DD`; the server defaults to one month ago.
    pub start: Option<String>,
    pub end: Option<String>,
    pub timezone: Option<String>,
    pub fields: Vec<String>,
    /// Passed through uninterpreted; the server enforces its bounds.
    pub limit: Option<i64>,
    /// Include field metadata in the response.
    pub info: bool,
    pub interval: Option<Interval>,
    /// Event names, or `*` for all events.
    pub events: Vec<String>,
    /// Each entry becomes its own query parameter.
    pub filters: BTreeMap<String, String>,
    pub timeout: Option<Duration>,
}

impl StatsQuery {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            path: None,
            start: None,
            end: None,
            timezone: None,
            fields: Vec::new(),
            limit: None,
            info: true,
            interval: None,
            events: Vec::new(),
            filters: BTreeMap::new(),
            timeout: None,
        }
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
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

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn info(mut self, info: bool) -> Self {
        self.info = info;
        self
    }

    pub fn interval(mut self, interval: Interval) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.events = events.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Request path: `/<hostname>.json` or `/<hostname>/<path>.json`.
    pub fn endpoint(&self) -> String {
        let host = self.hostname.trim().trim_matches('/');
        match self.path.as_deref().map(|p| p.trim_start_matches('/')) {
            Some(page) if !page.is_empty() => format!("/{host}/{page}.json"),
            _ => format!("/{host}.json"),
        }
    }

    pub fn encode(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .set("version", API_VERSION.to_string())
            .set("info", self.info.to_string())
            .set_opt("start", self.start.as_deref())
            .set_opt("end", self.end.as_deref())
            .set_opt("timezone", self.timezone.as_deref())
            .set_opt("limit", self.limit)
            .set_opt("interval", self.interval.map(|i| i.as_str()))
            .set_list("fields", &self.fields)
            .set_list("events", &self.events);

        for (key, value) in &self.filters {
            params.set(key, value.as_str());
        }
        params
    }
}

/// Inputs of an Export API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportQuery {
    pub hostname: String,
    /// `YYYY-MM-DD`, or `YYYY-MM-DDTHH` for hourly ranges.
    pub start: String,
    pub end: String,
    pub format: ExportFormat,
    pub fields: Vec<String>,
    pub timezone: Option<String>,
    /// Include bot traffic.
    pub robots: bool,
    pub data_type: DataType,
    pub timeout: Option<Duration>,
}

impl ExportQuery {
    pub fn new(hostname: impl Into<String>, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            start: start.into(),
            end: end.into(),
            format: ExportFormat::Json,
            fields: Vec::new(),
            timezone: None,
            robots: false,
            data_type: DataType::Pageviews,
            timeout: None,
        }
    }

    pub fn format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn robots(mut self, robots: bool) -> Self {
        self.robots = robots;
        self
    }

    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn encode(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .set("version", API_VERSION.to_string())
            .set("hostname", self.hostname.as_str())
            .set("start", self.start.as_str())
            .set("end", self.end.as_str())
            .set("format", self.format.as_str())
            .set("type", self.data_type.as_str())
            .set("robots", self.robots.to_string())
            .set_list("fields", &self.fields)
            .set_opt("timezone", self.timezone.as_deref());
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_order_preserved_without_dedup() {
        let params = StatsQuery::new("example.com")
            .fields(["pageviews", "pageviews"])
            .encode();
        assert_eq!(params.get("fields"), Some("pageviews,pageviews"));

        let params = StatsQuery::new("example.com")
            .events(["signup", "purchase", "signup"])
            .encode();
        assert_eq!(params.get("events"), Some("signup,purchase,signup"));
    }

    #[test]
    fn test_filters_become_independent_params() {
        let params = StatsQuery::new("example.com")
            .filter("device_type", "desktop")
            .filter("country", "US")
            .encode();
        assert_eq!(params.get("country"), Some("US"));
        assert_eq!(params.get("device_type"), Some("desktop"));
    }

    #[test]
    fn test_unknown_filter_keys_pass_through() {
        let params = StatsQuery::new("example.com")
            .filter("x_custom", "value*")
            .encode();
        assert_eq!(params.get("x_custom"), Some("value*"));
    }

    #[test]
    fn test_filter_colliding_with_param_replaces_in_place() {
        let params = StatsQuery::new("example.com")
            .limit(5)
            .filter("limit", "7")
            .encode();
        assert_eq!(params.get("limit"), Some("7"));
        assert_eq!(params.keys().filter(|k| *k == "limit").count(), 1);
    }

    #[test]
    fn test_out_of_range_limit_passes_through() {
        assert_eq!(StatsQuery::new("a.com").limit(5000).encode().get("limit"), Some("5000"));
        assert_eq!(StatsQuery::new("a.com").limit(0).encode().get("limit"), Some("0"));
        assert_eq!(StatsQuery::new("a.com").limit(-1).encode().get("limit"), Some("-1"));
    }

    #[test]
    fn test_empty_and_absent_values_omitted() {
        let params = StatsQuery::new("example.com")
            .start("")
            .timezone("")
            .filter("country", "")
            .encode();
        let keys: Vec<&str> = params.keys().collect();
        assert_eq!(keys, vec!["version", "info"]);
    }

    #[test]
    fn test_stats_defaults() {
        let params = StatsQuery::new("example.com").encode();
        assert_eq!(params.get("version"), Some("5"));
        assert_eq!(params.get("info"), Some("true"));
        assert_eq!(StatsQuery::new("a.com").info(false).encode().get("info"), Some("false"));
    }

    #[test]
    fn test_stats_endpoint() {
        assert_eq!(StatsQuery::new("example.com").endpoint(), "/example.com.json");
        assert_eq!(
            StatsQuery::new("example.com").path("/pricing").endpoint(),
            "/example.com/pricing.json"
        );
        assert_eq!(
            StatsQuery::new("example.com").path("blog/post").endpoint(),
            "/example.com/blog/post.json"
        );
        assert_eq!(StatsQuery::new("example.com").path("/").endpoint(), "/example.com.json");
    }

    #[test]
    fn test_interval_encoded() {
        let params = StatsQuery::new("a.com").interval(Interval::Week).encode();
        assert_eq!(params.get("interval"), Some("week"));
    }

    #[test]
    fn test_export_encoding() {
        let params = ExportQuery::new("example.com", "2024-01-01", "2024-01-31")
            .format(ExportFormat::Csv)
            .fields(["added_iso", "path"])
            .data_type(DataType::Events)
            .encode();
        let pairs: Vec<(&str, &str)> = params.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("version", "5"),
                ("hostname", "example.com"),
                ("start", "2024-01-01"),
                ("end", "2024-01-31"),
                ("format", "csv"),
                ("type", "events"),
                ("robots", "false"),
                ("fields", "added_iso,path"),
            ]
        );
    }

    #[test]
    fn test_export_timezone_and_robots() {
        let params = ExportQuery::new("a.com", "2024-01-01T00", "2024-01-01T23")
            .timezone("Europe/Amsterdam")
            .robots(true)
            .encode();
        assert_eq!(params.get("timezone"), Some("Europe/Amsterdam"));
        assert_eq!(params.get("robots"), Some("true"));
        assert_eq!(params.get("format"), Some("json"));
        assert_eq!(params.get("type"), Some("pageviews"));
    }
}
