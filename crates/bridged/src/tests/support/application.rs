//! In-process stand-in for the external application on the far end of the
//! framed channel.

use std::io::{self, PipeReader, PipeWriter};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crate::channel::{FrameReader, Inbound, write_frame};
use crate::envelope::Envelope;

use super::WAIT_TIMEOUT;

const MAX_FRAME_BYTES: usize = 1 << 20;

/// Reads the frames the bridge forwards and writes replies back.
pub struct FakeApplication {
    requests: Receiver<Envelope>,
    replies: Option<PipeWriter>,
}

/// Channel ends handed to the bridge under test.
pub struct BridgeEnds {
    /// Stream the bridge reads replies from.
    pub input: PipeReader,
    /// Stream the bridge writes requests to.
    pub output: PipeWriter,
}

impl FakeApplication {
    /// Creates the application and the channel ends the bridge should use.
    pub fn connect() -> io::Result<(Self, BridgeEnds)> {
        let (bridge_input, replies) = io::pipe()?;
        let (forwarded, bridge_output) = io::pipe()?;
        let (sender, requests) = mpsc::channel();
        thread::Builder::new()
            .name("fake-application".to_owned())
            .spawn(move || {
                let mut reader = FrameReader::new(forwarded, MAX_FRAME_BYTES);
                while let Ok(Inbound::Message(envelope)) = reader.receive() {
                    if sender.send(envelope).is_err() {
                        break;
                    }
                }
            })?;
        let application = Self {
            requests,
            replies: Some(replies),
        };
        let ends = BridgeEnds {
            input: bridge_input,
            output: bridge_output,
        };
        Ok((application, ends))
    }

    /// Waits for the next forwarded request.
    pub fn next_request(&self) -> Option<Envelope> {
        self.requests.recv_timeout(WAIT_TIMEOUT).ok()
    }

    /// Returns true when nothing is forwarded within `window`.
    pub fn stays_silent(&self, window: Duration) -> bool {
        matches!(
            self.requests.recv_timeout(window),
            Err(RecvTimeoutError::Timeout)
        )
    }

    /// Writes `reply` as one frame.
    pub fn reply(&mut self, reply: &Envelope) -> Result<(), String> {
        let writer = self
            .replies
            .as_mut()
            .ok_or_else(|| "application channel already closed".to_owned())?;
        let payload = reply.to_vec().map_err(|error| error.to_string())?;
        write_frame(writer, &payload).map_err(|error| error.to_string())
    }

    /// Closes the reply stream; the bridge observes end of stream.
    pub fn close(&mut self) {
        self.replies = None;
    }
}
