//! Test harness utilities for the bridge behavioural suites.

mod application;
mod config_loader;
mod reporter;
mod shutdown;

pub use application::{BridgeEnds, FakeApplication};
pub use config_loader::{FailingConfigLoader, quiet_config};
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use shutdown::TestShutdownSignal;

use std::time::{Duration, Instant};

/// Upper bound for any wait in a scenario.
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Polls `condition` until it holds or [`WAIT_TIMEOUT`] elapses.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT_TIMEOUT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(POLL_INTERVAL);
    }
    condition()
}
