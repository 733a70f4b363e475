//! Local interface family availability, for the `ADDRCONFIG` hint.
//!
//! A UDP socket is bound and connected toward a public address per family;
//! `connect` on UDP sends nothing, it only asks the OS for a route, which
//! is exactly the question `ADDRCONFIG` poses.

use std::net::UdpSocket;
use std::sync::Arc;

/// Probe returning `(ipv4_available, ipv6_available)`.
pub type InterfaceProbe = Arc<dyn Fn() -> (bool, bool) + Send + Sync>;

const PROBE_V4: &str = "8.8.8.8:53";
const PROBE_V6: &str = "[2001:4860:4860::8888]:53";

fn routable(bind: &str, target: &str) -> bool {
    UdpSocket::bind(bind)
        .and_then(|socket| socket.connect(target))
        .is_ok()
}

/// Probe the local interfaces for usable IPv4 and IPv6 routes.
pub fn probe_families() -> (bool, bool) {
    let v4 = routable("0.0.0.0:0", PROBE_V4);
    let v6 = routable("[::]:0", PROBE_V6);
    tracing::debug!(v4, v6, "probed local interface families");
    (v4, v6)
}

/// The default probe as a shareable handle.
pub fn default_probe() -> InterfaceProbe {
    Arc::new(probe_families)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_does_not_panic() {
        // Environment-dependent result; only the call contract is checked.
        let (_v4, _v6) = probe_families();
    }
}
