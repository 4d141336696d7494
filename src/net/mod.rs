//! Connectivity checks run before any network lookup.
//!
//! A failed probe sends the scheduler straight to its retry delay without
//! spending a full HTTP timeout on a lookup that cannot succeed.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use crate::time_source::TimeSource;

#[cfg_attr(test, mockall::automock)]
pub trait ConnectivityProbe {
    /// Try up to `retry_count` times, pausing `retry_interval` between attempts.
    /// Returns true on the first success.
    fn check(&self, retry_count: u32, retry_interval: Duration, timeout: Duration) -> bool;
}

/// Probe that opens (and immediately drops) a TCP connection to a well-known host.
pub struct TcpProbe {
    host: String,
    time_source: Arc<dyn TimeSource>,
    debug_enabled: bool,
}

impl TcpProbe {
    pub fn new(host: &str, time_source: Arc<dyn TimeSource>, debug_enabled: bool) -> Self {
        Self {
            host: host.to_string(),
            time_source,
            debug_enabled,
        }
    }

    fn resolve(&self) -> Vec<SocketAddr> {
        if let Ok(addr) = self.host.parse::<SocketAddr>() {
            return vec![addr];
        }
        self.host
            .to_socket_addrs()
            .map(|addrs| addrs.collect())
            .unwrap_or_default()
    }

    fn attempt(&self, timeout: Duration) -> bool {
        self.resolve()
            .iter()
            .any(|addr| TcpStream::connect_timeout(addr, timeout).is_ok())
    }
}

impl ConnectivityProbe for TcpProbe {
    fn check(&self, retry_count: u32, retry_interval: Duration, timeout: Duration) -> bool {
        let attempts = retry_count.max(1);
        for attempt in 1..=attempts {
            if self.attempt(timeout) {
                return true;
            }
            if self.debug_enabled {
                log_debug!("Connectivity check {attempt}/{attempts} to {} failed", self.host);
            }
            if attempt < attempts {
                self.time_source.sleep(retry_interval);
            }
        }
        false
    }
}
