//! Vocabulary of the Simple Analytics API.
//!
//! Enums for parameters with a closed set of values, the documented field
//! names, and optional typed views over response JSON.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Histogram granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Hour,
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Hour => "hour",
            Interval::Day => "day",
            Interval::Week => "week",
            Interval::Month => "month",
            Interval::Year => "year",
        }
    }
}

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

/// Kind of data points to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    Pageviews,
    Events,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Pageviews => "pageviews",
            DataType::Events => "events",
        }
    }
}

macro_rules! impl_display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display_as_str!(Interval, ExportFormat, DataType);

/// Fields accepted by the Stats API `fields` parameter.
pub const STATS_FIELDS: &[&str] = &[
    "pageviews",
    "visitors",
    "histogram",
    "pages",
    "countries",
    "referrers",
    "utm_sources",
    "utm_mediums",
    "utm_campaigns",
    "utm_contents",
    "utm_terms",
    "browser_names",
    "os_names",
    "device_types",
    "seconds_on_page",
];

/// Fields accepted by the Export API `fields` parameter.
pub const EXPORT_FIELDS: &[&str] = &[
    "added_iso",
    "added_unix",
    "hostname",
    "path",
    "query",
    "is_unique",
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_content",
    "utm_term",
    "scrolled_percentage",
    "duration_seconds",
    "device_type",
    "country_code",
    "browser_name",
    "browser_version",
    "os_name",
    "os_version",
    "viewport_width",
    "viewport_height",
    "screen_width",
    "screen_height",
    "language",
    "session_id",
    "referrer_hostname",
    "referrer_path",
    "datapoint_id",
];

/// Filter parameters documented for the Stats API. Others are passed
/// through unchanged.
pub const FILTER_FIELDS: &[&str] = &[
    "page",
    "pages",
    "country",
    "referrer",
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_content",
    "utm_term",
    "browser_name",
    "os_name",
    "device_type",
];

/// One point of a `histogram` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramEntry {
    pub date: String,
    pub pageviews: u64,
    pub visitors: u64,
}

/// One row of a breakdown field such as `pages` or `countries`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageStats {
    pub value: String,
    #[serde(default)]
    pub pageviews: Option<u64>,
    #[serde(default)]
    pub visitors: Option<u64>,
    #[serde(default)]
    pub seconds_on_page: Option<f64>,
}

/// Website entry returned by the Admin API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebsiteInfo {
    pub hostname: String,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub public: Option<bool>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(Interval::Week.to_string(), "week");
        assert_eq!(ExportFormat::Csv.as_str(), "csv");
        assert_eq!(DataType::Events.to_string(), "events");
        assert_eq!(Interval::default(), Interval::Day);
        let parsed: Interval = serde_json::from_str("\"month\"").unwrap();
        assert_eq!(parsed, Interval::Month);
    }

    #[test]
    fn test_website_info_tolerates_missing_fields() {
        let json = serde_json::json!({"hostname": "example.com", "public": true});
        let site: WebsiteInfo = serde_json::from_value(json).unwrap();
        assert_eq!(site.hostname, "example.com");
        assert_eq!(site.public, Some(true));
        assert!(site.label.is_none());
    }

    #[test]
    fn test_histogram_entry_deserialize() {
        let json = serde_json::json!({"date": "2024-01-01", "pageviews": 100, "visitors": 50});
        let entry: HistogramEntry = serde_json::from_value(json).unwrap();
        assert_eq!(entry.pageviews, 100);
    }
}
