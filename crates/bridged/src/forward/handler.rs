//! Connection handler that forwards client requests to the application.

use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tracing::{debug, info, warn};

use bridge_config::Config;

use crate::channel::ChannelSender;
use crate::correlation::{CorrelationTable, RequestOutcome};
use crate::envelope::{Envelope, RequestId};
use crate::transport::ConnectionHandler;

use super::errors::HandlerError;
use super::request::read_request;
use super::response::ResponseWriter;
use super::{CHANNEL_UNAVAILABLE, HANDLER_TARGET, TIMEOUT};

/// Limits applied to every client exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardSettings {
    /// Ceiling on the wait for the application's reply.
    pub request_timeout: Duration,
    /// Ceiling on each read of the client request.
    pub read_timeout: Duration,
    /// Largest accepted client request.
    pub max_request_bytes: usize,
}

impl ForwardSettings {
    /// Extracts the forwarding limits from the resolved configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            request_timeout: config.request_timeout(),
            read_timeout: config.client_read_timeout(),
            max_request_bytes: config.max_request_bytes(),
        }
    }
}

/// Serves one request per connection by relaying it over the application
/// channel and waiting for the matching reply.
#[derive(Debug)]
pub struct ForwardingHandler {
    table: Arc<CorrelationTable>,
    sender: ChannelSender,
    settings: ForwardSettings,
}

impl ForwardingHandler {
    /// Builds a handler sharing `table` with the inbound dispatcher.
    pub fn new(table: Arc<CorrelationTable>, sender: ChannelSender, settings: ForwardSettings) -> Self {
        Self {
            table,
            sender,
            settings,
        }
    }

    fn exchange(
        &self,
        stream: &mut TcpStream,
        peer: SocketAddr,
        assigned: &mut Option<RequestId>,
    ) -> Result<(), HandlerError> {
        stream
            .set_read_timeout(Some(self.settings.read_timeout))
            .map_err(|source| HandlerError::Read { source })?;
        let Some(bytes) = read_request(stream, self.settings.max_request_bytes)? else {
            debug!(target: HANDLER_TARGET, %peer, "client disconnected without request");
            return Ok(());
        };
        let mut request =
            Envelope::parse(&bytes).map_err(|source| HandlerError::Parse { source })?;

        let id = match request.id().cloned() {
            Some(id) => id,
            None => {
                let id = RequestId::for_peer(peer, SystemTime::now());
                request.set_id(id.clone());
                id
            }
        };
        *assigned = Some(id.clone());
        info!(
            target: HANDLER_TARGET,
            %peer,
            %id,
            name = request.name().unwrap_or_default(),
            message = %request.preview(),
            "forwarding request"
        );

        let pending = self.table.register(id.clone())?;
        let outcome = match self.sender.send(&request) {
            Ok(()) => pending.wait(self.settings.request_timeout),
            Err(error) => {
                warn!(
                    target: HANDLER_TARGET,
                    %id,
                    error = %error,
                    "failed to forward request"
                );
                RequestOutcome::TransportClosed
            }
        };
        drop(pending);

        let reply = match outcome {
            RequestOutcome::Delivered(reply) => reply,
            RequestOutcome::TimedOut => Envelope::failure(Some(id.clone()), TIMEOUT),
            RequestOutcome::TransportClosed => {
                Envelope::failure(Some(id.clone()), CHANNEL_UNAVAILABLE)
            }
        };
        ResponseWriter::new(&mut *stream).write_envelope(&reply)?;
        info!(
            target: HANDLER_TARGET,
            %peer,
            %id,
            ok = reply.ok(),
            "response sent"
        );
        Ok(())
    }
}

impl ConnectionHandler for ForwardingHandler {
    fn handle(&self, mut stream: TcpStream, peer: SocketAddr) {
        let mut assigned = None;
        if let Err(error) = self.exchange(&mut stream, peer, &mut assigned) {
            warn!(
                target: HANDLER_TARGET,
                %peer,
                id = assigned.as_ref().map(RequestId::as_str),
                error = %error,
                "client exchange failed"
            );
            let notified =
                ResponseWriter::new(&mut stream).write_failure(assigned, error.client_message());
            if let Err(error) = notified {
                debug!(
                    target: HANDLER_TARGET,
                    %peer,
                    error = %error,
                    "client could not be notified"
                );
            }
        }
        if let Err(error) = stream.shutdown(Shutdown::Both) {
            debug!(target: HANDLER_TARGET, %peer, error = %error, "socket already closed");
        }
    }
}
