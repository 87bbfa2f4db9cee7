//! Response serialisation for client connections.

use std::io::Write;

use crate::envelope::{Envelope, RequestId};

use super::errors::HandlerError;

/// Writes a single compact JSON reply to a client.
pub(super) struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    pub(super) fn new(writer: W) -> Self {
        Self { writer }
    }

    pub(super) fn write_envelope(&mut self, envelope: &Envelope) -> Result<(), HandlerError> {
        let bytes = envelope
            .to_vec()
            .map_err(|source| HandlerError::Encode { source })?;
        self.writer
            .write_all(&bytes)
            .and_then(|()| self.writer.flush())
            .map_err(|source| HandlerError::Write { source })
    }

    pub(super) fn write_failure(
        &mut self,
        id: Option<RequestId>,
        message: impl Into<String>,
    ) -> Result<(), HandlerError> {
        self.write_envelope(&Envelope::failure(id, message))
    }
}
