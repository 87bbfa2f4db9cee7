//! Routes replies from the application channel to waiting requests.
//!
//! Exactly one dispatcher owns the channel's read half. Replies without a
//! usable id are logged and dropped. The loop runs until the application
//! closes the stream or sends a frame that is not JSON at all; either way the listener keeps serving, and new requests resolve by
//! timeout until the process is restarted.

use std::io::{self, Read};
use std::sync::Arc;
use std::thread;

use tracing::{debug, info, warn};

use crate::channel::{ChannelError, FrameReader, Inbound};
use crate::correlation::CorrelationTable;
use crate::health::HealthReporter;

const INBOUND_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Why the dispatch loop stopped.
#[derive(Debug)]
pub enum DispatchExit {
    /// The application closed its output stream.
    EndOfStream,
    /// Reading or decoding a frame failed.
    Failed(ChannelError),
}

/// Counters reported when the dispatch loop stops.
#[derive(Debug)]
pub struct DispatchSummary {
    /// Why the loop ended.
    pub exit: DispatchExit,
    /// Replies handed to a waiting request.
    pub delivered: u64,
    /// Replies whose id matched no pending request.
    pub missed: u64,
    /// Messages discarded for lacking a usable id or not being an object.
    pub discarded: u64,
}

impl DispatchSummary {
    fn new() -> Self {
        Self {
            exit: DispatchExit::EndOfStream,
            delivered: 0,
            missed: 0,
            discarded: 0,
        }
    }
}

/// Single consumer of the application channel.
#[derive(Debug)]
pub struct InboundDispatcher<R> {
    reader: FrameReader<R>,
    table: Arc<CorrelationTable>,
}

impl<R: Read> InboundDispatcher<R> {
    /// Builds a dispatcher reading frames from `reader`.
    pub fn new(reader: FrameReader<R>, table: Arc<CorrelationTable>) -> Self {
        Self { reader, table }
    }

    /// Delivers replies until the channel ends.
    pub fn run(mut self) -> DispatchSummary {
        let mut summary = DispatchSummary::new();
        loop {
            match self.reader.receive() {
                Ok(Inbound::Message(envelope)) => {
                    let Some(id) = envelope.id().cloned() else {
                        warn!(
                            target: INBOUND_TARGET,
                            message = %envelope.preview(),
                            "discarding application message without an id"
                        );
                        summary.discarded += 1;
                        continue;
                    };
                    debug!(target: INBOUND_TARGET, %id, "routing reply");
                    if self.table.deliver(&id, envelope) {
                        summary.delivered += 1;
                    } else {
                        summary.missed += 1;
                    }
                }
                Ok(Inbound::Unroutable { reason }) => {
                    warn!(
                        target: INBOUND_TARGET,
                        reason = %reason,
                        "discarding application message that is not a JSON object"
                    );
                    summary.discarded += 1;
                }
                Ok(Inbound::EndOfStream) => {
                    info!(target: INBOUND_TARGET, "application channel reached end of stream");
                    summary.exit = DispatchExit::EndOfStream;
                    break;
                }
                Err(error) => {
                    warn!(
                        target: INBOUND_TARGET,
                        error = %error,
                        protocol_violation = error.is_protocol_violation(),
                        "application channel failed; no further replies will be routed"
                    );
                    summary.exit = DispatchExit::Failed(error);
                    break;
                }
            }
        }
        summary
    }
}

impl<R> InboundDispatcher<R>
where
    R: Read + Send + 'static,
{
    /// Runs the dispatcher on a dedicated thread, reporting to `reporter`
    /// as soon as the channel closes.
    pub fn spawn(
        self,
        reporter: Arc<dyn HealthReporter>,
    ) -> io::Result<thread::JoinHandle<DispatchSummary>> {
        thread::Builder::new()
            .name("inbound-dispatcher".to_owned())
            .spawn(move || {
                let summary = self.run();
                reporter.channel_closed(&summary);
                summary
            })
    }
}
