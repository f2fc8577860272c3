//! Cheap reachability checks consulted before any provider call.

use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};

pub trait ConnectivityGate: Send + Sync {
    /// Must return promptly; this is a capability check, not a round-trip.
    fn is_reachable(&self) -> bool;
}

/// Asks the OS for a route to `target` by connecting an unbound UDP socket.
/// No packet is sent, so the answer comes from the local routing table.
#[derive(Debug, Clone)]
pub struct RouteProbe {
    target: SocketAddr,
}

impl RouteProbe {
    pub fn new(target: SocketAddr) -> Self {
        Self { target }
    }
}

impl ConnectivityGate for RouteProbe {
    fn is_reachable(&self) -> bool {
        let bind_addr: SocketAddr = if self.target.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };

        let reachable = UdpSocket::bind(bind_addr)
            .and_then(|socket| socket.connect(self.target))
            .is_ok();
        if !reachable {
            tracing::debug!("no route to {}", self.target);
        }
        reachable
    }
}

/// Fixed answer, for forced offline mode. Tests flip it with `set_online`.
#[derive(Debug)]
pub struct StaticGate {
    online: AtomicBool,
}

impl StaticGate {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    #[cfg(test)]
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl ConnectivityGate for StaticGate {
    fn is_reachable(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_gate_toggles() {
        let gate = StaticGate::new(false);
        assert!(!gate.is_reachable());
        gate.set_online(true);
        assert!(gate.is_reachable());
    }

    #[test]
    fn test_route_probe_loopback() {
        // Loopback always has a route, even on machines without a network
        let probe = RouteProbe::new("127.0.0.1:9".parse().unwrap());
        assert!(probe.is_reachable());
    }
}
