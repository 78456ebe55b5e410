//! CLI command implementations.

pub mod config;
pub mod export;
pub mod stats;
pub mod websites;

use chrono::{Duration, Local, NaiveDate};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use serde_json::Value;

use sa_api::{Client, ClientConfig};
use sa_core::config::AppConfig;
use sa_core::error::{SaError, SaResult};

/// Days covered by stats commands when no start date is given.
pub const DEFAULT_STATS_DAYS: i64 = 30;

/// Days covered by exports when no start date is given.
pub const DEFAULT_EXPORT_DAYS: i64 = 7;

/// Helper to create an API client from config.
pub fn create_client(config: &AppConfig) -> SaResult<Client> {
    Client::new(ClientConfig::from_app_config(config))
}

/// The hostname given on the command line, else the configured default.
pub fn resolve_hostname(arg: Option<String>, config: &AppConfig) -> SaResult<String> {
    arg.or_else(|| config.defaults.hostname.clone())
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .ok_or_else(|| {
            SaError::Config(format!(
                "no hostname given; pass one or set {}",
                sa_core::constants::env::HOSTNAME
            ))
        })
}

/// Resolve an optional `start`/`end` pair. A missing end is today, a missing
/// start is `days` before the end. Explicit dates are passed through as typed.
pub fn date_range(start: Option<String>, end: Option<String>, days: i64) -> (String, String) {
    date_range_from(Local::now().date_naive(), start, end, days)
}

fn date_range_from(
    today: NaiveDate,
    start: Option<String>,
    end: Option<String>,
    days: i64,
) -> (String, String) {
    let end = end.unwrap_or_else(|| format_date(today));
    let start = start.unwrap_or_else(|| {
        let anchor = NaiveDate::parse_from_str(&end, "%Y-%m-%d").unwrap_or(today);
        format_date(anchor - Duration::days(days))
    });
    (start, end)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse `key=value` filter arguments.
pub fn parse_filters(raw: &[String]) -> SaResult<Vec<(String, String)>> {
    raw.iter()
        .map(|entry| {
            entry
                .split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .filter(|(k, _)| !k.is_empty())
                .ok_or_else(|| SaError::Config(format!("invalid filter '{entry}', expected key=value")))
        })
        .collect()
}

/// Print a JSON value for scripting.
pub fn print_json(value: &Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// A table with the shared CLI styling.
pub fn new_table<I, S>(header: I) -> Table
where
    I: IntoIterator<Item = S>,
    S: Into<comfy_table::Cell>,
{
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

/// Render a JSON scalar for a table cell.
pub fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) if n.is_f64() => format!("{f:.1}"),
            _ => n.to_string(),
        },
        Some(other) => other.to_string(),
    }
}

/// Truncate a string to a maximum number of characters, appending an
/// ellipsis if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
