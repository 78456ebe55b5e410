//! Stats commands: aggregated statistics, histograms and events.

use clap::Args;
use console::style;
use serde_json::Value;

use sa_api::{EventsQuery, HistogramEntry, HistogramQuery, Interval, Payload, StatsQuery};
use sa_core::config::AppConfig;
use sa_core::error::SaResult;

use super::{cell, new_table, print_json, truncate};
use crate::OutputFormat;

/// Histogram granularity.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum IntervalArg {
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl From<IntervalArg> for Interval {
    fn from(arg: IntervalArg) -> Self {
        match arg {
            IntervalArg::Hour => Interval::Hour,
            IntervalArg::Day => Interval::Day,
            IntervalArg::Week => Interval::Week,
            IntervalArg::Month => Interval::Month,
            IntervalArg::Year => Interval::Year,
        }
    }
}

#[derive(Args)]
pub struct StatsArgs {
    /// Website hostname (defaults to SA_HOSTNAME or the config file).
    pub hostname: Option<String>,
    /// Page path, e.g. /pricing.
    #[arg(short, long)]
    pub path: Option<String>,
    /// Start date (YYYY-MM-DD). Defaults to 30 days before the end date.
    #[arg(short, long)]
    pub start: Option<String>,
    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(short, long)]
    pub end: Option<String>,
    /// Comma-separated fields, e.g. pageviews,visitors,pages.
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,
    /// Number of rows for list fields.
    #[arg(short = 'n', long)]
    pub limit: Option<i64>,
    /// Timezone, e.g. Europe/Amsterdam.
    #[arg(short, long)]
    pub timezone: Option<String>,
    /// Histogram interval.
    #[arg(short, long)]
    pub interval: Option<IntervalArg>,
    /// Filter as key=value (repeatable), e.g. country=US.
    #[arg(long = "filter")]
    pub filters: Vec<String>,
    /// Leave field metadata out of the response.
    #[arg(long)]
    pub no_info: bool,
}

#[derive(Args)]
pub struct HistogramArgs {
    /// Website hostname (defaults to SA_HOSTNAME or the config file).
    pub hostname: Option<String>,
    /// Start date (YYYY-MM-DD). Defaults to 30 days before the end date.
    #[arg(short, long)]
    pub start: Option<String>,
    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(short, long)]
    pub end: Option<String>,
    /// Histogram interval.
    #[arg(short, long, default_value = "day")]
    pub interval: IntervalArg,
    /// Timezone, e.g. Europe/Amsterdam.
    #[arg(short, long)]
    pub timezone: Option<String>,
}

#[derive(Args)]
pub struct EventsArgs {
    /// Website hostname (defaults to SA_HOSTNAME or the config file).
    pub hostname: Option<String>,
    /// Comma-separated event names. All events when omitted.
    #[arg(long, value_delimiter = ',')]
    pub events: Vec<String>,
    /// Start date (YYYY-MM-DD). Defaults to 30 days before the end date.
    #[arg(short, long)]
    pub start: Option<String>,
    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(short, long)]
    pub end: Option<String>,
}

pub fn run_stats(config: &AppConfig, args: StatsArgs, format: OutputFormat) -> SaResult<()> {
    let hostname = super::resolve_hostname(args.hostname, config)?;
    let (start, end) = super::date_range(args.start, args.end, super::DEFAULT_STATS_DAYS);

    let mut query = StatsQuery::new(hostname.as_str())
        .start(start.as_str())
        .end(end.as_str())
        .fields(args.fields)
        .info(!args.no_info);
    query.path = args.path;
    query.limit = args.limit;
    query.timezone = args.timezone.or_else(|| config.defaults.timezone.clone());
    query.interval = args.interval.map(Interval::from);
    for (key, value) in super::parse_filters(&args.filters)? {
        query = query.filter(key, value);
    }

    let client = super::create_client(config)?;
    let stats = client.scope(|c| c.stats().get(&query))?;

    match format {
        OutputFormat::Json => print_json(&stats),
        OutputFormat::Text => {
            println!(
                "{} {} ({start} to {end})",
                style("Stats for").bold(),
                style(&hostname).cyan()
            );
            render_stats(&stats)?;
        }
    }
    Ok(())
}

pub fn run_histogram(config: &AppConfig, args: HistogramArgs, format: OutputFormat) -> SaResult<()> {
    let hostname = super::resolve_hostname(args.hostname, config)?;
    let (start, end) = super::date_range(args.start, args.end, super::DEFAULT_STATS_DAYS);

    let mut query = HistogramQuery::new(hostname.as_str())
        .start(start.as_str())
        .end(end.as_str())
        .interval(args.interval.into());
    query.timezone = args.timezone.or_else(|| config.defaults.timezone.clone());

    let client = super::create_client(config)?;
    let data = client.scope(|c| c.stats().get_histogram(&query))?;

    match format {
        OutputFormat::Json => print_json(&data),
        OutputFormat::Text => {
            println!(
                "{} {} per {}",
                style("Histogram for").bold(),
                style(&hostname).cyan(),
                query.interval
            );
            match data.get("histogram") {
                Some(points) => render_histogram(points)?,
                None => println!("No histogram data."),
            }
        }
    }
    Ok(())
}

pub fn run_events(config: &AppConfig, args: EventsArgs, format: OutputFormat) -> SaResult<()> {
    let hostname = super::resolve_hostname(args.hostname, config)?;
    let (start, end) = super::date_range(args.start, args.end, super::DEFAULT_STATS_DAYS);

    let mut query = EventsQuery::new(hostname.as_str()).start(start.as_str()).end(end.as_str());
    if !args.events.is_empty() {
        query = query.events(args.events);
    }
    query.timezone = config.defaults.timezone.clone();

    let client = super::create_client(config)?;
    let data = client.scope(|c| c.stats().get_events(&query))?;

    match format {
        OutputFormat::Json => print_json(&data),
        OutputFormat::Text => {
            let events = data.get("events").and_then(Value::as_array);
            match events {
                Some(events) if !events.is_empty() => {
                    let mut table = new_table(vec!["Event", "Total"]);
                    for event in events {
                        table.add_row(vec![cell(event.get("name")), cell(event.get("total"))]);
                    }
                    println!("{table}");
                }
                _ => println!("No events found."),
            }
        }
    }
    Ok(())
}

/// Print scalar metrics as one table, then one table per list field.
fn render_stats(stats: &Value) -> SaResult<()> {
    let Some(fields) = stats.as_object() else {
        print_json(stats);
        return Ok(());
    };

    let mut summary = new_table(vec!["Metric", "Value"]);
    let mut has_summary = false;
    for (key, value) in fields {
        if !value.is_array() && !value.is_object() {
            summary.add_row(vec![key.clone(), cell(Some(value))]);
            has_summary = true;
        }
    }
    if has_summary {
        println!("{summary}");
    }

    for (key, value) in fields {
        let Some(rows) = value.as_array() else { continue };
        println!("\n{}", style(key).bold());
        if key == "histogram" {
            render_histogram(value)?;
        } else if rows.is_empty() {
            println!("  (none)");
        } else {
            let mut table = new_table(vec!["Value", "Pageviews", "Visitors"]);
            for row in rows {
                let label = row.get("value").map(|v| cell(Some(v))).unwrap_or_else(|| row.to_string());
                table.add_row(vec![
                    truncate(&label, 50),
                    cell(row.get("pageviews")),
                    cell(row.get("visitors")),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}

fn render_histogram(points: &Value) -> SaResult<()> {
    let entries: Vec<HistogramEntry> = Payload::Json(points.clone()).deserialize()?;
    if entries.is_empty() {
        println!("No histogram data.");
        return Ok(());
    }

    let mut table = new_table(vec!["Date", "Pageviews", "Visitors"]);
    for entry in &entries {
        table.add_row(vec![
            entry.date.clone(),
            entry.pageviews.to_string(),
            entry.visitors.to_string(),
        ]);
    }
    println!("{table}");

    let pageviews: u64 = entries.iter().map(|e| e.pageviews).sum();
    let visitors: u64 = entries.iter().map(|e| e.visitors).sum();
    println!(
        "{} {pageviews} pageviews, {visitors} visitors",
        style("Total:").dim()
    );
    Ok(())
}
