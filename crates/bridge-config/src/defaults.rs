//! Built-in values used when a setting is absent from every layer.

use crate::logging::LogFormat;

/// Interface the TCP service binds when none is configured (all interfaces).
pub const DEFAULT_TCP_HOST: &str = "0.0.0.0";

/// TCP port clients connect to when none is configured.
pub const DEFAULT_TCP_PORT: u16 = 7345;

/// Ceiling for a forwarded request awaiting its reply: fifteen minutes.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15 * 60;

/// Time allowed for a TCP client to deliver its request document.
pub const DEFAULT_CLIENT_READ_TIMEOUT_SECS: u64 = 30;

/// Upper bound for a single TCP request document.
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 64 * 1024 * 1024;

/// Upper bound for a single inbound application-channel frame.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 64 * 1024 * 1024;

/// Default `tracing` filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default logging format for the daemon.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}
