//! Advisory check for a backend listening on a local port.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;

/// What a connection attempt to `localhost:port` suggests about the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortStatus {
    /// Something accepted the connection.
    LikelyInUse,
    /// The connection was refused, failed or timed out.
    LikelyFree,
}

/// Try a TCP connection to `localhost:port`, giving up after `timeout`. Only ever used as a
/// warning; never gate on it.
pub async fn probe(port: u16, timeout: Duration) -> PortStatus {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_)) => PortStatus::LikelyInUse,
        Ok(Err(err)) => {
            tracing::debug!("probe of {addr} failed: {err}");
            PortStatus::LikelyFree
        }
        Err(_) => {
            tracing::debug!("probe of {addr} timed out");
            PortStatus::LikelyFree
        }
    }
}
