//! Outbound half of the application channel.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::envelope::Envelope;

use super::{CHANNEL_TARGET, ChannelError};

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Cloneable handle that serialises frames onto the application channel.
///
/// Every clone shares one lock, held from the first prefix byte to the final
/// flush, so frames from concurrent handlers never interleave.
#[derive(Clone)]
pub struct ChannelSender {
    writer: SharedWriter,
}

impl ChannelSender {
    /// Wraps the write half of the application channel.
    pub fn new<W>(writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Encodes `envelope` as compact JSON and writes it as one frame.
    ///
    /// Encoding happens before the lock is taken; only the byte transfer is
    /// serialised.
    pub fn send(&self, envelope: &Envelope) -> Result<(), ChannelError> {
        let payload = envelope
            .to_vec()
            .map_err(|source| ChannelError::Encode { source })?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| ChannelError::WriterPoisoned)?;
        write_frame(&mut *writer, &payload)?;
        drop(writer);
        debug!(
            target: CHANNEL_TARGET,
            bytes = payload.len(),
            message = %envelope.preview(),
            "frame sent"
        );
        Ok(())
    }
}

impl fmt::Debug for ChannelSender {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("ChannelSender").finish_non_exhaustive()
    }
}

/// Writes the length prefix and `payload`, then flushes.
pub fn write_frame<W: Write + ?Sized>(writer: &mut W, payload: &[u8]) -> Result<(), ChannelError> {
    let length = u32::try_from(payload.len()).map_err(|_| ChannelError::FrameTooLarge {
        declared: payload.len(),
        max: u32::MAX as usize,
    })?;
    write_all(writer, &length.to_le_bytes())?;
    write_all(writer, payload)?;
    writer.flush().map_err(|source| ChannelError::Io { source })
}

fn write_all<W: Write + ?Sized>(writer: &mut W, bytes: &[u8]) -> Result<(), ChannelError> {
    writer
        .write_all(bytes)
        .map_err(|source| ChannelError::Io { source })
}

/// In-memory sink whose contents remain readable after being handed to a
/// [`ChannelSender`].
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

#[cfg(test)]
impl SharedBuffer {
    pub(crate) fn contents(&self) -> Vec<u8> {
        self.0.lock().expect("shared buffer poisoned").clone()
    }
}

#[cfg(test)]
impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("shared buffer poisoned").write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
