//! Error types for application-channel framing.

use std::io;

use thiserror::Error;

/// Errors surfaced while reading or writing frames.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The underlying stream failed.
    #[error("application channel I/O failed: {source}")]
    Io {
        #[source]
        source: io::Error,
    },
    /// A complete frame did not hold a JSON envelope.
    #[error("malformed frame payload: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },
    /// An outgoing envelope could not be serialised.
    #[error("failed to encode envelope: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
    /// A frame length exceeded the configured or representable maximum.
    #[error("frame of {declared} bytes exceeds the {max} byte limit")]
    FrameTooLarge { declared: usize, max: usize },
    /// A writer panicked while holding the channel lock.
    #[error("application channel writer lock poisoned")]
    WriterPoisoned,
}

impl ChannelError {
    /// Returns true for malformed frames, as opposed to transport failures.
    #[must_use]
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::FrameTooLarge { .. })
    }
}
