//! Length-prefixed JSON framing over the application channel.
//!
//! Each frame is a 4-byte little-endian payload length followed by that many
//! bytes of UTF-8 JSON. The channel has one reader, the inbound dispatcher,
//! and many writers, the connection handlers, which share a [`ChannelSender`]
//! so that frames are never interleaved.

mod errors;
mod reader;
mod sender;

pub use self::errors::ChannelError;
pub use self::reader::{FrameReader, Inbound};
pub use self::sender::{ChannelSender, write_frame};
#[cfg(test)]
pub(crate) use self::sender::SharedBuffer;

const CHANNEL_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::channel");

/// Size of the length prefix in bytes.
pub const PREFIX_LEN: usize = 4;
