//! Supervises bridge launch sequencing and runtime orchestration.

use std::io::{self, Read, Write};
use std::sync::Arc;

use tracing::{error, info};

use crate::StructuredHealthReporter;
use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::health::HealthReporter;
use crate::runtime::{BridgeRuntime, RuntimeSettings};

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Collaborators required to launch the bridge.
pub struct LaunchPlan<L, S, R, W> {
    /// Source of the configuration.
    pub loader: L,
    /// Receiver of lifecycle events.
    pub reporter: Arc<dyn HealthReporter>,
    /// Blocks until the process should stop.
    pub shutdown: S,
    /// Read half of the application channel.
    pub input: R,
    /// Write half of the application channel.
    pub output: W,
}

/// Runs the bridge on stdin/stdout using the production collaborators.
pub fn run_bridge() -> Result<(), LaunchError> {
    run_bridge_with(LaunchPlan {
        loader: SystemConfigLoader,
        reporter: Arc::new(StructuredHealthReporter::new()),
        shutdown: SystemShutdownSignal::new(),
        input: io::stdin(),
        output: io::stdout(),
    })
}

/// Runs the bridge with injected collaborators.
pub fn run_bridge_with<L, S, R, W>(plan: LaunchPlan<L, S, R, W>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    S: ShutdownSignal,
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    let LaunchPlan {
        loader,
        reporter,
        shutdown,
        input,
        output,
    } = plan;

    let bridge = bootstrap_with(&loader, reporter)?;
    let settings = RuntimeSettings::from_config(bridge.config());
    let runtime = match BridgeRuntime::start(&settings, bridge.reporter(), input, output) {
        Ok(runtime) => runtime,
        Err(source) => {
            error!(
                target: PROCESS_TARGET,
                host = %settings.tcp_host,
                port = settings.tcp_port,
                error = %source,
                "failed to start bridge runtime"
            );
            return Err(source.into());
        }
    };

    shutdown.wait()?;
    runtime.stop()?;
    info!(
        target: PROCESS_TARGET,
        "shutdown sequence completed"
    );
    Ok(())
}
