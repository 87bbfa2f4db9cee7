//! TCP exchange with the bridge: one document out, everything until close in.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::AppError;

pub(crate) const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);
/// The application may take a long time to answer.
pub(crate) const READ_TIMEOUT: Duration = Duration::from_secs(900);

pub(crate) fn connect(host: &str, port: u16) -> Result<TcpStream, AppError> {
    let endpoint = format!("{host}:{port}");
    let address = resolve_tcp_address(host, port).map_err(|source| AppError::Resolve {
        endpoint: endpoint.clone(),
        source,
    })?;
    let stream = TcpStream::connect_timeout(&address, CONNECTION_TIMEOUT)
        .map_err(|source| AppError::Connect { endpoint, source })?;
    stream
        .set_read_timeout(Some(READ_TIMEOUT))
        .map_err(AppError::ReadResponse)?;
    Ok(stream)
}

/// Writes `request`, half-closes, and reads until the bridge closes.
pub(crate) fn exchange(mut stream: TcpStream, request: &[u8]) -> Result<Vec<u8>, AppError> {
    stream.write_all(request).map_err(AppError::SendRequest)?;
    stream.flush().map_err(AppError::SendRequest)?;
    stream
        .shutdown(Shutdown::Write)
        .map_err(AppError::SendRequest)?;

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .map_err(AppError::ReadResponse)?;
    Ok(response)
}

/// Resolves `host`, preferring IPv4 since the bridge binds an IPv4 interface.
fn resolve_tcp_address(host: &str, port: u16) -> io::Result<SocketAddr> {
    let addrs: Vec<SocketAddr> = (host, port).to_socket_addrs()?.collect();
    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses"))
}
