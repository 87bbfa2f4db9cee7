//! Test helpers for the transport module.

use std::io::Write;
use std::net::{SocketAddr, TcpStream};
use std::sync::Mutex;

use super::ConnectionHandler;

/// Records every peer it serves and greets it with its own address.
#[derive(Debug, Default)]
pub(crate) struct PeerRecorder {
    peers: Mutex<Vec<SocketAddr>>,
}

impl PeerRecorder {
    pub(crate) fn peers(&self) -> Vec<SocketAddr> {
        self.peers.lock().expect("peer list poisoned").clone()
    }
}

impl ConnectionHandler for PeerRecorder {
    fn handle(&self, mut stream: TcpStream, peer: SocketAddr) {
        self.peers.lock().expect("peer list poisoned").push(peer);
        let _ = write!(stream, "{peer}");
    }
}
