//! Tracing subscriber setup for the library and the CLI.
//!
//! Console output goes to stderr so that command output on stdout (JSON,
//! CSV) stays machine-readable. File output rotates daily.

use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::SaResult;

/// Log file name prefix inside the log directory.
const LOG_FILE_NAME: &str = "simple-analytics.log";

/// HTTP stack crates that are only interesting at warn level.
const QUIET_TARGETS: &[&str] = &["hyper", "hyper_util", "reqwest", "rustls"];

/// Build the filter for `level`, keeping the HTTP stack quiet.
/// Unparseable levels fall back to `info`.
fn build_filter(level: &str) -> EnvFilter {
    QUIET_TARGETS.iter().fold(
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info")),
        |filter, target| match format!("{target}=warn").parse() {
            Ok(directive) => filter.add_directive(directive),
            Err(_) => filter,
        },
    )
}

fn stderr_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer().with_writer(std::io::stderr).with_target(true).compact()
}

/// Install the global subscriber: stderr plus a daily-rotated file in
/// `log_dir` (created if missing). With `json_output` the file gets one
/// JSON object per line. Returns a guard that must outlive all logging.
///
/// A subscriber that is already installed is left in place.
pub fn init_logging(level: &str, log_dir: &Path, json_output: bool) -> SaResult<LogGuard> {
    std::fs::create_dir_all(log_dir)?;

    let (writer, guard): (NonBlocking, WorkerGuard) =
        tracing_appender::non_blocking(rolling::daily(log_dir, LOG_FILE_NAME));

    let json_file = json_output.then(|| {
        fmt::layer()
            .json()
            .with_writer(writer.clone())
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
    });
    let plain_file = (!json_output).then(|| {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_file(true)
            .with_line_number(true)
    });

    let installed = tracing_subscriber::registry()
        .with(build_filter(level))
        .with(stderr_layer())
        .with(json_file)
        .with(plain_file)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(log_level = level, dir = %log_dir.display(), "file logging enabled");
    }
    Ok(LogGuard { _worker: guard })
}

/// Flushes the file writer when dropped.
pub struct LogGuard {
    _worker: WorkerGuard,
}

/// Console-only subscriber, used when no log directory is usable.
pub fn init_console_logging(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(build_filter(level))
        .with(stderr_layer())
        .try_init();
}
