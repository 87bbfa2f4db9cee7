//! Connection handling abstraction for the TCP listener.

use std::net::{SocketAddr, TcpStream};

/// Handles accepted client connections.
pub trait ConnectionHandler: Send + Sync + 'static {
    /// Handles a single connection. Implementations should avoid panicking;
    /// a panic is confined to the connection's own thread.
    fn handle(&self, stream: TcpStream, peer: SocketAddr);
}
