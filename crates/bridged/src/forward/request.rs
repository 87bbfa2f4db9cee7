//! Bounded read of a single client request.

use std::io::{self, Read};

use serde::de::IgnoredAny;

use super::errors::HandlerError;

const CHUNK_BYTES: usize = 64 * 1024;

/// Reads one JSON document from `stream`.
///
/// Returns `Ok(None)` when the client disconnects without sending anything.
/// Reading stops once the buffer holds a complete JSON value, the client
/// half-closes, or the read timeout fires with data already buffered; an
/// incomplete buffer is returned as-is and rejected by the parser.
pub(super) fn read_request<R: Read>(
    stream: &mut R,
    max_bytes: usize,
) -> Result<Option<Vec<u8>>, HandlerError> {
    let mut buffer = Vec::new();
    let mut chunk = vec![0_u8; CHUNK_BYTES];
    loop {
        let read = match read_with_retry(stream, &mut chunk) {
            Ok(read) => read,
            Err(error) if is_timeout(&error) && !buffer.is_empty() => break,
            Err(source) => return Err(HandlerError::Read { source }),
        };
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(chunk.get(..read).unwrap_or_default());
        if buffer.len() > max_bytes {
            return Err(HandlerError::RequestTooLarge {
                size: buffer.len(),
                max: max_bytes,
            });
        }
        if is_complete(&buffer) {
            break;
        }
    }
    Ok((!buffer.is_empty()).then_some(buffer))
}

fn read_with_retry<R: Read>(stream: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match stream.read(buf) {
            Ok(read) => return Ok(read),
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        }
    }
}

fn is_timeout(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

// Only a buffer ending in a closing bracket can hold a complete object, so
// the full parse is skipped for the common mid-document chunk.
fn is_complete(buffer: &[u8]) -> bool {
    let last = buffer
        .iter()
        .rev()
        .find(|byte| !byte.is_ascii_whitespace());
    if !matches!(last, Some(b'}' | b']')) {
        return false;
    }
    match serde_json::from_slice::<IgnoredAny>(buffer) {
        Ok(_) => true,
        Err(error) => !error.is_eof(),
    }
}
