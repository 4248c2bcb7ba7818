//! One-shot reachability check used to seed the tracker at startup.
//!
//! This runs once. Later changes come only from network signals.

use std::time::Duration;

use tokio::net::TcpStream;

use crate::ConnectivityState;

/// Default time allowed for the startup probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Attempts a TCP connection to `addr` (`host:port`) and reports the
/// result as a [`ConnectivityState`].
pub async fn probe_reachability(addr: &str, timeout: Duration) -> ConnectivityState {
    match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_)) => ConnectivityState::Online,
        Ok(Err(e)) => {
            log::debug!("Reachability probe to {addr} failed: {e}");
            ConnectivityState::Offline
        }
        Err(_) => {
            log::debug!("Reachability probe to {addr} timed out after {timeout:?}");
            ConnectivityState::Offline
        }
    }
}
