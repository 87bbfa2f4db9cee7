//! Configuration for the `bridged` daemon.
//!
//! Values layer in the usual `ortho_config` order: built-in defaults, a TOML
//! file named by `--config-path`, `BRIDGE_*` environment variables, then
//! command-line flags. Every field is optional on disk; the accessors on
//! [`Config`] fold in the defaults from [`defaults`].

use std::ffi::OsString;
use std::sync::Arc;
use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

mod args;
pub mod defaults;
mod logging;

pub use args::{CONFIG_CLI_FLAGS, config_arguments};
pub use defaults::{
    DEFAULT_CLIENT_READ_TIMEOUT_SECS, DEFAULT_LOG_FILTER, DEFAULT_MAX_FRAME_BYTES,
    DEFAULT_MAX_REQUEST_BYTES, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TCP_HOST, DEFAULT_TCP_PORT,
    default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError, LogSink};

/// Bridge configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "BRIDGE")]
pub struct Config {
    /// Interface the TCP service binds.
    pub tcp_host: Option<String>,
    /// Port the TCP service binds.
    pub tcp_port: Option<u16>,
    /// Seconds a forwarded request may wait for its reply.
    pub request_timeout_secs: Option<u64>,
    /// Seconds a TCP client may take to deliver its request.
    pub client_read_timeout_secs: Option<u64>,
    /// Largest accepted TCP request document, in bytes.
    pub max_request_bytes: Option<usize>,
    /// Largest accepted inbound application-channel frame, in bytes.
    pub max_frame_bytes: Option<usize>,
    /// `tracing` filter expression.
    pub log_filter: Option<String>,
    /// Log output format.
    pub log_format: Option<LogFormat>,
    /// Optional log file; stderr when unset.
    pub log_file: Option<Utf8PathBuf>,
}

impl Config {
    /// Loads configuration from the process arguments, ignoring tokens that
    /// are not configuration flags.
    pub fn load_filtered() -> Result<Self, Arc<OrthoError>> {
        let args: Vec<OsString> = std::env::args_os().collect();
        Self::load_from_iter(config_arguments(&args))
    }

    /// Interface the TCP service binds.
    #[must_use]
    pub fn tcp_host(&self) -> &str {
        self.tcp_host.as_deref().unwrap_or(DEFAULT_TCP_HOST)
    }

    /// Port the TCP service binds.
    #[must_use]
    pub fn tcp_port(&self) -> u16 {
        self.tcp_port.unwrap_or(DEFAULT_TCP_PORT)
    }

    /// Ceiling for the rendezvous wait of a forwarded request.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// Read timeout applied to accepted client sockets.
    #[must_use]
    pub fn client_read_timeout(&self) -> Duration {
        Duration::from_secs(
            self.client_read_timeout_secs
                .unwrap_or(DEFAULT_CLIENT_READ_TIMEOUT_SECS),
        )
    }

    /// Largest accepted TCP request document.
    #[must_use]
    pub fn max_request_bytes(&self) -> usize {
        self.max_request_bytes.unwrap_or(DEFAULT_MAX_REQUEST_BYTES)
    }

    /// Largest accepted inbound frame.
    #[must_use]
    pub fn max_frame_bytes(&self) -> usize {
        self.max_frame_bytes.unwrap_or(DEFAULT_MAX_FRAME_BYTES)
    }

    /// `tracing` filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format.unwrap_or_else(default_log_format)
    }

    /// Destination for diagnostic output.
    #[must_use]
    pub fn log_sink(&self) -> LogSink {
        LogSink::from_path(self.log_file.as_ref())
    }
}
