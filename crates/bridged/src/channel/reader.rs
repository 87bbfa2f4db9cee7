//! Inbound half of the application channel.

use std::io::{self, Read};

use serde_json::Value;
use tracing::{debug, warn};

use crate::envelope::Envelope;

use super::{CHANNEL_TARGET, ChannelError, PREFIX_LEN};

/// Result of a single [`FrameReader::receive`] call.
#[derive(Debug)]
pub enum Inbound {
    /// A complete frame holding a JSON envelope.
    Message(Envelope),
    /// A complete frame holding valid JSON that is not an object.
    ///
    /// The frame boundary is intact, so reading can continue.
    Unroutable {
        /// Why the value could not be read as an envelope.
        reason: serde_json::Error,
    },
    /// The peer closed the stream, possibly mid-frame.
    EndOfStream,
}

/// Reads length-prefixed envelopes from a byte stream.
///
/// A reader must have exactly one owner; framing state lives in the stream
/// position, so concurrent readers would split frames between them.
#[derive(Debug)]
pub struct FrameReader<R> {
    reader: R,
    max_frame_bytes: usize,
}

impl<R: Read> FrameReader<R> {
    /// Wraps `reader`, rejecting frames longer than `max_frame_bytes`.
    pub fn new(reader: R, max_frame_bytes: usize) -> Self {
        Self {
            reader,
            max_frame_bytes,
        }
    }

    /// Blocks until a complete frame or the end of the stream.
    ///
    /// A short read of either the prefix or the payload is reported as
    /// [`Inbound::EndOfStream`]; the stream cannot be resynchronised after a
    /// partial frame.
    pub fn receive(&mut self) -> Result<Inbound, ChannelError> {
        let mut prefix = [0_u8; PREFIX_LEN];
        let prefix_read = read_full(&mut self.reader, &mut prefix)?;
        if prefix_read == 0 {
            debug!(target: CHANNEL_TARGET, "application channel closed");
            return Ok(Inbound::EndOfStream);
        }
        if prefix_read < PREFIX_LEN {
            warn!(
                target: CHANNEL_TARGET,
                read = prefix_read,
                expected = PREFIX_LEN,
                "application channel closed inside a length prefix"
            );
            return Ok(Inbound::EndOfStream);
        }

        let declared = decode_length(prefix);
        if declared > self.max_frame_bytes {
            return Err(ChannelError::FrameTooLarge {
                declared,
                max: self.max_frame_bytes,
            });
        }

        let mut payload = vec![0_u8; declared];
        let payload_read = read_full(&mut self.reader, &mut payload)?;
        if payload_read < declared {
            warn!(
                target: CHANNEL_TARGET,
                read = payload_read,
                expected = declared,
                "application channel closed inside a frame payload"
            );
            return Ok(Inbound::EndOfStream);
        }

        let value: Value =
            serde_json::from_slice(&payload).map_err(|source| ChannelError::Decode { source })?;
        let envelope = match Envelope::from_value(value) {
            Ok(envelope) => envelope,
            Err(reason) => return Ok(Inbound::Unroutable { reason }),
        };
        debug!(
            target: CHANNEL_TARGET,
            bytes = declared,
            message = %envelope.preview(),
            "frame received"
        );
        Ok(Inbound::Message(envelope))
    }
}

fn decode_length(prefix: [u8; PREFIX_LEN]) -> usize {
    u32::from_le_bytes(prefix) as usize
}

/// Fills `buf` unless the stream ends first; returns the number of bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, ChannelError> {
    let mut filled = 0;
    while filled < buf.len() {
        let Some(rest) = buf.get_mut(filled..) else {
            break;
        };
        match reader.read(rest) {
            Ok(0) => break,
            Ok(read) => filled += read,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => return Err(ChannelError::Io { source }),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::write_frame;
    use rstest::rstest;
    use std::io::Cursor;

    fn frame(payload: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        write_frame(&mut bytes, payload).expect("write frame");
        bytes
    }

    fn reader(bytes: Vec<u8>) -> FrameReader<Cursor<Vec<u8>>> {
        FrameReader::new(Cursor::new(bytes), 1024)
    }

    #[test]
    fn receives_consecutive_frames() {
        let mut bytes = frame(br#"{"id":"A","ok":true}"#);
        bytes.extend(frame(br#"{"id":"B","ok":false}"#));
        let mut reader = reader(bytes);

        let Inbound::Message(first) = reader.receive().expect("first") else {
            panic!("expected first message");
        };
        let Inbound::Message(second) = reader.receive().expect("second") else {
            panic!("expected second message");
        };
        assert_eq!(first.id().map(|id| id.as_str()), Some("A"));
        assert_eq!(second.ok(), Some(false));
        assert!(matches!(reader.receive(), Ok(Inbound::EndOfStream)));
    }

    #[rstest]
    #[case::empty(Vec::new())]
    #[case::short_prefix(vec![5, 0])]
    #[case::short_payload({
        let mut bytes = frame(br#"{"id":"A"}"#);
        bytes.truncate(bytes.len() - 3);
        bytes
    })]
    fn short_reads_end_the_stream(#[case] bytes: Vec<u8>) {
        assert!(matches!(reader(bytes).receive(), Ok(Inbound::EndOfStream)));
    }

    #[test]
    fn oversized_frames_are_rejected() {
        let bytes = frame(&[b' '; 2048]);
        let error = reader(bytes).receive().expect_err("frame should be too large");
        assert!(matches!(
            error,
            ChannelError::FrameTooLarge {
                declared: 2048,
                max: 1024
            }
        ));
    }

    #[test]
    fn non_object_payloads_do_not_break_framing() {
        let mut bytes = frame(b"[1]");
        bytes.extend(frame(br#"{"id":"A","ok":true}"#));
        let mut reader = reader(bytes);

        assert!(matches!(reader.receive(), Ok(Inbound::Unroutable { .. })));
        let Inbound::Message(next) = reader.receive().expect("next frame") else {
            panic!("expected the following message");
        };
        assert_eq!(next.id().map(|id| id.as_str()), Some("A"));
    }

    #[test]
    fn malformed_payloads_are_protocol_errors() {
        let error = reader(frame(b"{not json")).receive().expect_err("decode");
        assert!(error.is_protocol_violation());
    }
}
