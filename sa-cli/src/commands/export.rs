//! Export command.

use std::path::PathBuf;

use clap::Args;
use console::style;
use serde_json::Value;
use tracing::info;

use sa_api::{DataType, ExportFormat, ExportQuery, Payload};
use sa_core::config::AppConfig;
use sa_core::error::SaResult;

use super::{cell, new_table, print_json, truncate};
use crate::OutputFormat;

/// Export output format.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ExportFormatArg {
    Json,
    Csv,
}

/// Kind of data points to export.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum DataTypeArg {
    Pageviews,
    Events,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Website hostname (defaults to SA_HOSTNAME or the config file).
    pub hostname: Option<String>,
    /// Start date (YYYY-MM-DD or YYYY-MM-DDTHH). Defaults to 7 days before the end date.
    #[arg(short, long)]
    pub start: Option<String>,
    /// End date (YYYY-MM-DD or YYYY-MM-DDTHH). Defaults to today.
    #[arg(short, long)]
    pub end: Option<String>,
    /// Export format requested from the server.
    #[arg(long = "as", default_value = "json")]
    pub export_format: ExportFormatArg,
    /// Comma-separated fields, e.g. added_iso,path,country_code.
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,
    /// Timezone, e.g. Europe/Amsterdam.
    #[arg(short, long)]
    pub timezone: Option<String>,
    /// Include bot traffic.
    #[arg(long)]
    pub robots: bool,
    /// Kind of data points.
    #[arg(long = "type", default_value = "pageviews")]
    pub data_type: DataTypeArg,
    /// Write the export to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(config: &AppConfig, args: ExportArgs, format: OutputFormat) -> SaResult<()> {
    let hostname = super::resolve_hostname(args.hostname, config)?;
    let (start, end) = super::date_range(args.start, args.end, super::DEFAULT_EXPORT_DAYS);

    let mut query = ExportQuery::new(hostname.as_str(), start.as_str(), end.as_str())
        .format(match args.export_format {
            ExportFormatArg::Json => ExportFormat::Json,
            ExportFormatArg::Csv => ExportFormat::Csv,
        })
        .data_type(match args.data_type {
            DataTypeArg::Pageviews => DataType::Pageviews,
            DataTypeArg::Events => DataType::Events,
        })
        .fields(args.fields)
        .robots(args.robots);
    query.timezone = args.timezone.or_else(|| config.defaults.timezone.clone());

    let client = super::create_client(config)?;
    let payload = client.scope(|c| c.export().datapoints(&query))?;

    if let Some(path) = &args.output {
        let contents = match &payload {
            Payload::Text(text) => text.clone(),
            Payload::Json(value) => serde_json::to_string_pretty(value)?,
        };
        std::fs::write(path, contents)?;
        info!("export written to {}", path.display());
        println!(
            "{} {} ({})",
            style("Exported to").green(),
            path.display(),
            describe(&payload)
        );
        return Ok(());
    }

    match (&payload, format) {
        (Payload::Text(csv), _) => print!("{csv}"),
        (Payload::Json(value), OutputFormat::Json) => print_json(value),
        (Payload::Json(value), OutputFormat::Text) => render_datapoints(value),
    }
    Ok(())
}

/// Short summary of an export's size.
fn describe(payload: &Payload) -> String {
    match payload {
        Payload::Text(csv) => {
            let rows = csv.lines().filter(|l| !l.trim().is_empty()).count();
            format!("{} data points", rows.saturating_sub(1))
        }
        Payload::Json(Value::Array(points)) => format!("{} data points", points.len()),
        Payload::Json(_) => "1 document".to_string(),
    }
}

fn render_datapoints(value: &Value) {
    let Some(points) = value.as_array() else {
        print_json(value);
        return;
    };
    if points.is_empty() {
        println!("No data points found.");
        return;
    }

    let columns: Vec<String> = points[0]
        .as_object()
        .map(|o| o.keys().cloned().collect())
        .unwrap_or_default();
    if columns.is_empty() {
        print_json(value);
        return;
    }

    let mut table = new_table(columns.clone());
    for point in points {
        table.add_row(
            columns
                .iter()
                .map(|c| truncate(&cell(point.get(c)), 40))
                .collect::<Vec<_>>(),
        );
    }
    println!("{table}");
    println!("{} data points", points.len());
}
