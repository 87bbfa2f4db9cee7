//! Per-connection request forwarding.
//!
//! A [`ForwardingHandler`] serves exactly one request per TCP connection:
//! read, parse, assign an id, register, forward, await, respond, close.

mod errors;
mod handler;
mod request;
mod response;

pub use self::errors::HandlerError;
pub use self::handler::{ForwardSettings, ForwardingHandler};

const HANDLER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");

/// Error text sent when a request could not reach the application.
pub const CHANNEL_UNAVAILABLE: &str = "application channel unavailable";
/// Error text sent when no reply arrived in time.
pub const TIMEOUT: &str = "timeout";
