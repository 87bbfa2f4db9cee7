//! Correlation of in-flight requests with their replies.
//!
//! Each forwarded request owns a single-use rendezvous slot keyed by its id.
//! The table mutex guards only map operations; the blocking wait happens on
//! the slot's private channel, so a slow request never stalls registration or
//! delivery for others.

mod errors;

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError, TrySendError};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, warn};

use crate::envelope::{Envelope, RequestId};

pub use self::errors::CorrelationError;

const CORRELATION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::correlation");

/// How a forwarded request was resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    /// The application replied.
    Delivered(Envelope),
    /// No reply arrived before the ceiling.
    TimedOut,
    /// The request could not be forwarded, or its slot was torn down unfilled.
    TransportClosed,
}

/// Shared map from request id to rendezvous slot.
///
/// An entry stays registered until its [`PendingRequest`] is dropped, even
/// after delivery, so a duplicate id is refused for as long as the original
/// handler is still answering its client.
#[derive(Debug, Default)]
pub struct CorrelationTable {
    slots: Mutex<HashMap<RequestId, Option<SyncSender<Envelope>>>>,
}

impl CorrelationTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `id` and returns the slot its reply will arrive in.
    ///
    /// The returned guard unregisters `id` when dropped.
    pub fn register(&self, id: RequestId) -> Result<PendingRequest<'_>, CorrelationError> {
        let (sender, receiver) = mpsc::sync_channel(1);
        let mut slots = self.slots();
        if slots.contains_key(&id) {
            return Err(CorrelationError::Conflict { id });
        }
        slots.insert(id.clone(), Some(sender));
        drop(slots);
        debug!(target: CORRELATION_TARGET, %id, "request registered");
        Ok(PendingRequest {
            table: self,
            id,
            receiver,
        })
    }

    /// Hands `envelope` to the request waiting on `id`.
    ///
    /// Returns `false`, dropping the envelope, when `id` is unknown or its
    /// slot has already been filled or closed. The non-blocking send happens
    /// under the table lock so it cannot race a waiter giving up.
    pub fn deliver(&self, id: &RequestId, envelope: Envelope) -> bool {
        let mut slots = self.slots();
        let Some(sender) = slots.get_mut(id).and_then(Option::take) else {
            drop(slots);
            warn!(
                target: CORRELATION_TARGET,
                %id,
                "reply has no pending request; it may have timed out already"
            );
            return false;
        };
        let sent = sender.try_send(envelope);
        drop(slots);
        match sent {
            Ok(()) => {
                debug!(target: CORRELATION_TARGET, %id, "reply delivered");
                true
            }
            Err(TrySendError::Disconnected(_) | TrySendError::Full(_)) => {
                warn!(
                    target: CORRELATION_TARGET,
                    %id,
                    "pending request stopped waiting before the reply arrived"
                );
                false
            }
        }
    }

    /// Closes the slot for `id` without unregistering it.
    fn close_slot(&self, id: &RequestId) {
        drop(self.slots().get_mut(id).and_then(Option::take));
    }

    /// Removes `id`. Removing an unknown id is a no-op.
    pub fn unregister(&self, id: &RequestId) {
        if self.slots().remove(id).is_some() {
            debug!(target: CORRELATION_TARGET, %id, "request unregistered");
        }
    }

    /// Returns true while `id` is registered.
    #[must_use]
    pub fn contains(&self, id: &RequestId) -> bool {
        self.slots().contains_key(id)
    }

    /// Number of registered requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots().len()
    }

    /// Returns true when no request is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots().is_empty()
    }

    // Critical sections are single map calls plus a non-blocking send, so a
    // panic cannot leave the map half-updated and the poison flag can be
    // ignored.
    fn slots(&self) -> MutexGuard<'_, HashMap<RequestId, Option<SyncSender<Envelope>>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A registered request awaiting its reply.
///
/// Dropping the guard unregisters the id on every exit path.
#[derive(Debug)]
pub struct PendingRequest<'table> {
    table: &'table CorrelationTable,
    id: RequestId,
    receiver: Receiver<Envelope>,
}

impl PendingRequest<'_> {
    /// The id this request is registered under.
    #[must_use]
    pub fn id(&self) -> &RequestId {
        &self.id
    }

    /// Blocks until the reply arrives or `timeout` elapses.
    ///
    /// A reply that lands in the slot as the deadline passes is still
    /// returned, so a delivery the dispatcher counted is never lost.
    pub fn wait(&self, timeout: Duration) -> RequestOutcome {
        match self.receiver.recv_timeout(timeout) {
            Ok(envelope) => RequestOutcome::Delivered(envelope),
            Err(RecvTimeoutError::Timeout) => self.settle_after_deadline(timeout),
            Err(RecvTimeoutError::Disconnected) => RequestOutcome::TransportClosed,
        }
    }

    /// Closes the slot, then takes whatever reached it before the close.
    fn settle_after_deadline(&self, timeout: Duration) -> RequestOutcome {
        self.table.close_slot(&self.id);
        match self.receiver.try_recv() {
            Ok(envelope) => {
                debug!(
                    target: CORRELATION_TARGET,
                    id = %self.id,
                    "reply arrived at the deadline"
                );
                RequestOutcome::Delivered(envelope)
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => {
                warn!(
                    target: CORRELATION_TARGET,
                    id = %self.id,
                    timeout_ms = timeout.as_millis(),
                    "timed out waiting for reply"
                );
                RequestOutcome::TimedOut
            }
        }
    }
}

impl Drop for PendingRequest<'_> {
    fn drop(&mut self) {
        self.table.unregister(&self.id);
    }
}
