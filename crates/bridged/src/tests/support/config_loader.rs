//! Test configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};

use bridge_config::{Config, LogFormat};

use crate::bootstrap::ConfigLoader;

/// Configuration bound to an ephemeral loopback port with terse logging.
#[must_use]
pub fn quiet_config() -> Config {
    Config {
        tcp_host: Some("127.0.0.1".to_owned()),
        tcp_port: Some(0),
        request_timeout_secs: Some(2),
        log_filter: Some("warn".to_owned()),
        log_format: Some(LogFormat::Compact),
        ..Config::default()
    }
}

/// Loader that intentionally fails by passing an invalid port.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("bridged"),
            OsString::from("--tcp-port"),
            OsString::from("not-a-port"),
        ];
        Config::load_from_iter(args)
    }
}
