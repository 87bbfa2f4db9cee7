//! Test double for [`HealthReporter`] that records structured events for assertions.

use std::net::SocketAddr;
use std::sync::Mutex;

use bridge_config::Config;

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;
use crate::inbound::{DispatchExit, DispatchSummary};

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    /// Bootstrap started.
    BootstrapStarting,
    /// Bootstrap completed successfully.
    BootstrapSucceeded,
    /// Bootstrap failed with an error description.
    BootstrapFailed(String),
    /// The listener bound the given address.
    ListenerReady(SocketAddr),
    /// The application channel closed; true when it ended cleanly.
    ChannelClosed { end_of_stream: bool },
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    pub fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }

    /// Returns true once the channel-closed event has been recorded.
    #[must_use]
    pub fn saw_channel_closed(&self) -> bool {
        self.events()
            .iter()
            .any(|event| matches!(event, HealthEvent::ChannelClosed { .. }))
    }

    /// The address reported by the listener, if any.
    #[must_use]
    pub fn listener_addr(&self) -> Option<SocketAddr> {
        self.events().iter().find_map(|event| match event {
            HealthEvent::ListenerReady(addr) => Some(*addr),
            _ => None,
        })
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn listener_ready(&self, addr: SocketAddr) {
        self.record(HealthEvent::ListenerReady(addr));
    }

    fn channel_closed(&self, summary: &DispatchSummary) {
        self.record(HealthEvent::ChannelClosed {
            end_of_stream: matches!(summary.exit, DispatchExit::EndOfStream),
        });
    }
}
