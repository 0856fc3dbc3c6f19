use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::Subscriber;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, Layer, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    registry::LookupSpan, util::SubscriberInitExt,
};

const APP_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Installs the global subscriber on stderr, keeping stdout for the report
/// summary.
///
/// Quiet runs only surface warnings from this crate, such as amounts that
/// could not be converted or records that failed to normalize. `verbose`
/// adds per-page detail. `RUST_LOG` narrows both. When `log_file` is given,
/// info and above is also appended there regardless of `verbose`.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let (level_filter, level) = if verbose {
        (LevelFilter::DEBUG, "debug")
    } else {
        (LevelFilter::WARN, "warn")
    };
    let app_filter = Targets::new().with_target(APP_TARGET, level_filter);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let fmt_layer = if verbose {
        fmt::layer()
            .pretty()
            .without_time()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .compact()
            .without_time()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };
    let console_layer = fmt_layer.with_filter(app_filter).with_filter(env_filter);

    let file_layer = match log_file {
        Some(path) => Some(file_layer(path)?),
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install the log subscriber")?;
    Ok(())
}

/// Plain text layer appending this crate's info and above to `path`.
fn file_layer<S>(path: &Path) -> Result<impl Layer<S> + use<S>>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    let file = open_log_file(path)?;
    Ok(fmt::layer()
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .with_filter(Targets::new().with_target(APP_TARGET, LevelFilter::INFO)))
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))
}
