//! Defines the unified error surface for bridge launch and supervision.

use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::runtime::RuntimeError;

use super::shutdown::ShutdownError;

/// Errors surfaced while launching or supervising the bridge process.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Bootstrapping the bridge failed.
    #[error("bridge bootstrap failed: {source}")]
    Bootstrap {
        /// Underlying bootstrap error.
        #[source]
        source: BootstrapError,
    },
    /// Starting or stopping the runtime failed.
    #[error("bridge runtime failed: {source}")]
    Runtime {
        /// Underlying runtime error.
        #[source]
        source: RuntimeError,
    },
    /// Waiting for shutdown failed.
    #[error("failed to await shutdown signal: {source}")]
    Shutdown {
        /// Underlying shutdown error.
        #[source]
        source: ShutdownError,
    },
}

impl From<BootstrapError> for LaunchError {
    fn from(source: BootstrapError) -> Self {
        Self::Bootstrap { source }
    }
}

impl From<RuntimeError> for LaunchError {
    fn from(source: RuntimeError) -> Self {
        Self::Runtime { source }
    }
}

impl From<ShutdownError> for LaunchError {
    fn from(source: ShutdownError) -> Self {
        Self::Shutdown { source }
    }
}
