//! Wiring of the listener, correlation table and application channel.

use std::io::{self, Read, Write};
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;

use thiserror::Error;
use tracing::info;

use bridge_config::Config;

use crate::channel::{ChannelSender, FrameReader};
use crate::correlation::CorrelationTable;
use crate::forward::{ForwardSettings, ForwardingHandler};
use crate::health::HealthReporter;
use crate::inbound::{DispatchSummary, InboundDispatcher};
use crate::transport::{ListenerError, ListenerHandle, SocketListener};

const RUNTIME_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");

/// Settings the runtime needs from the resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSettings {
    /// Interface the TCP service binds.
    pub tcp_host: String,
    /// Port the TCP service binds; `0` picks an ephemeral port.
    pub tcp_port: u16,
    /// Largest accepted inbound frame.
    pub max_frame_bytes: usize,
    /// Per-connection limits.
    pub forward: ForwardSettings,
}

impl RuntimeSettings {
    /// Extracts runtime settings from the resolved configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            tcp_host: config.tcp_host().to_owned(),
            tcp_port: config.tcp_port(),
            max_frame_bytes: config.max_frame_bytes(),
            forward: ForwardSettings::from_config(config),
        }
    }
}

/// Errors raised while starting the runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The TCP listener could not be bound or started.
    #[error(transparent)]
    Listener(#[from] ListenerError),
    /// The inbound dispatcher thread could not be spawned.
    #[error("failed to spawn inbound dispatcher: {source}")]
    Dispatcher {
        #[source]
        source: io::Error,
    },
    /// The inbound dispatcher thread panicked.
    #[error("inbound dispatcher thread panicked")]
    DispatcherPanic,
}

/// A running bridge: the accept loop plus the inbound dispatcher.
#[derive(Debug)]
pub struct BridgeRuntime {
    local_addr: SocketAddr,
    table: Arc<CorrelationTable>,
    listener: ListenerHandle,
    dispatcher: thread::JoinHandle<DispatchSummary>,
}

impl BridgeRuntime {
    /// Binds the listener, then starts reading replies from `input` and
    /// accepting clients whose requests are written to `output`.
    ///
    /// A bind failure is returned before any thread is started.
    pub fn start<R, W>(
        settings: &RuntimeSettings,
        reporter: Arc<dyn HealthReporter>,
        input: R,
        output: W,
    ) -> Result<Self, RuntimeError>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        let listener = SocketListener::bind(&settings.tcp_host, settings.tcp_port)?;
        let local_addr = listener.local_addr();
        let table = Arc::new(CorrelationTable::new());

        let reader = FrameReader::new(input, settings.max_frame_bytes);
        let dispatcher = InboundDispatcher::new(reader, Arc::clone(&table))
            .spawn(Arc::clone(&reporter))
            .map_err(|source| RuntimeError::Dispatcher { source })?;

        let handler = Arc::new(ForwardingHandler::new(
            Arc::clone(&table),
            ChannelSender::new(output),
            settings.forward,
        ));
        let listener = listener.start(handler)?;
        reporter.listener_ready(local_addr);

        Ok(Self {
            local_addr,
            table,
            listener,
            dispatcher,
        })
    }

    /// Address clients connect to.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Table shared by the handlers and the dispatcher.
    #[must_use]
    pub fn table(&self) -> &Arc<CorrelationTable> {
        &self.table
    }

    /// Returns true once the application channel has closed.
    #[must_use]
    pub fn channel_closed(&self) -> bool {
        self.dispatcher.is_finished()
    }

    /// Stops accepting connections.
    ///
    /// Returns the dispatcher summary when the application channel has
    /// already closed; otherwise the dispatcher stays blocked on its read and
    /// ends with the process.
    pub fn stop(self) -> Result<Option<DispatchSummary>, RuntimeError> {
        self.listener.shutdown();
        self.listener.join()?;
        info!(target: RUNTIME_TARGET, "listener stopped");
        if !self.dispatcher.is_finished() {
            return Ok(None);
        }
        match self.dispatcher.join() {
            Ok(summary) => Ok(Some(summary)),
            Err(_) => Err(RuntimeError::DispatcherPanic),
        }
    }
}
