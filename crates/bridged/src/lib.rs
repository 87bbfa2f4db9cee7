//! TCP to application-channel message bridge.
//!
//! Short-lived TCP clients each send one JSON request. The bridge assigns a
//! correlation id when the client omitted one, forwards the request as a
//! length-prefixed frame on a single duplex stream (stdin/stdout in the
//! `bridged` binary) and answers the client with the application's reply
//! carrying the same id, or with a synthesised error once the wait ceiling
//! elapses.
//!
//! The moving parts:
//!
//! - [`channel`]: framing for the application channel, with a cloneable
//!   sender that serialises writes.
//! - [`correlation`]: the shared id-to-slot table and its rendezvous guards.
//! - [`inbound`]: the single reader that routes replies into the table.
//! - [`forward`]: the per-connection request/response exchange.
//! - [`transport`]: the TCP accept loop.

mod bootstrap;
pub mod channel;
pub mod correlation;
pub mod envelope;
pub mod forward;
mod health;
pub mod inbound;
mod process;
mod runtime;
mod telemetry;
pub mod transport;

pub use bootstrap::{
    BootstrapError, Bridge, ConfigLoader, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{
    LaunchError, LaunchPlan, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_bridge,
    run_bridge_with,
};
pub use runtime::{BridgeRuntime, RuntimeError, RuntimeSettings};
pub use telemetry::TelemetryError;

#[cfg(test)]
mod tests;
