//! Structured health reporting for bridge lifecycle events.

use std::net::SocketAddr;
use std::sync::Arc;

use bridge_config::Config;

use crate::bootstrap::BootstrapError;
use crate::inbound::{DispatchExit, DispatchSummary};

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked once the TCP listener accepts connections.
    fn listener_ready(&self, addr: SocketAddr);

    /// Invoked when the inbound dispatcher stops reading the application
    /// channel.
    fn channel_closed(&self, summary: &DispatchSummary);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn listener_ready(&self, addr: SocketAddr) {
        (**self).listener_ready(addr);
    }

    fn channel_closed(&self, summary: &DispatchSummary) {
        (**self).channel_closed(summary);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting bridge bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            tcp_host = config.tcp_host(),
            tcp_port = config.tcp_port(),
            request_timeout_secs = config.request_timeout().as_secs(),
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            "bridge bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "bridge bootstrap failed"
        );
    }

    fn listener_ready(&self, addr: SocketAddr) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listener_ready",
            %addr,
            "accepting client connections"
        );
    }

    fn channel_closed(&self, summary: &DispatchSummary) {
        let reason = match &summary.exit {
            DispatchExit::EndOfStream => "end of stream".to_owned(),
            DispatchExit::Failed(error) => error.to_string(),
        };
        tracing::error!(
            target: HEALTH_TARGET,
            event = "channel_closed",
            reason = %reason,
            delivered = summary.delivered,
            missed = summary.missed,
            discarded = summary.discarded,
            "application channel closed; pending and future requests will time out"
        );
    }
}
