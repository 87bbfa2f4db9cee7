//! Structured telemetry initialisation for the bridge.
//!
//! Diagnostics go to stderr or a log file, never to stdout: standard output
//! carries application-channel frames and a stray log line would corrupt the
//! framing seen by the peer.

use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::panic::{self, PanicHookInfo};
use std::sync::Mutex;
use std::thread;

use camino::Utf8PathBuf;
use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, writer::BoxMakeWriter};

use bridge_config::{Config, LogFormat, LogSink};

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

const PANIC_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Failed to open the configured log file.
    #[error("failed to open log file '{path}': {source}")]
    LogFile {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Configures the global tracing subscriber and panic hook when invoked for
/// the first time.
///
/// Only the first successful call touches global state; later calls return
/// `Ok(())` without reading `config`.
pub fn initialise(config: &Config) -> Result<(), TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| {
            install_subscriber(config)?;
            install_panic_hook();
            Ok(())
        })
        .map(|_| ())
}

fn install_subscriber(config: &Config) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(config.log_filter())
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;
    let sink = config.log_sink();
    let ansi = matches!(sink, LogSink::Stderr) && io::stderr().is_terminal();
    let writer = make_writer(sink)?;

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(true)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339());

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}

fn make_writer(sink: LogSink) -> Result<BoxMakeWriter, TelemetryError> {
    match sink {
        LogSink::Stderr => Ok(BoxMakeWriter::new(io::stderr)),
        LogSink::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path.as_std_path())
                .map_err(|source| TelemetryError::LogFile { path, source })?;
            Ok(BoxMakeWriter::new(Mutex::new(file)))
        }
    }
}

fn install_panic_hook() {
    panic::set_hook(Box::new(|info: &PanicHookInfo<'_>| {
        let thread = thread::current();
        tracing::error!(
            target: PANIC_TARGET,
            thread = thread.name().unwrap_or("<unnamed>"),
            location = %info
                .location()
                .map_or_else(|| "<unknown>".to_owned(), ToString::to_string),
            message = panic_message(info),
            "uncaught panic"
        );
    }));
}

fn panic_message<'a>(info: &'a PanicHookInfo<'_>) -> &'a str {
    let payload = info.payload();
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic payload>")
}
