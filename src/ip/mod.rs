//! IP-literal recognition.
//!
//! Classifies a hostname string as an IPv4 literal, an IPv6 literal, or a
//! name that requires DNS resolution. The check itself is pure; the lookup
//! controller memoizes results.

use std::net::{Ipv4Addr, Ipv6Addr};

/// Classification of a hostname string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpKind {
    /// A numeric dotted-quad IPv4 address.
    V4,
    /// An IPv6 address (hex groups, zero compression, v4-in-v6 included).
    V6,
    /// Not an IP literal; DNS resolution is required.
    No,
}

/// Trait for IP-literal recognition.
///
/// Implementations must be pure: no network I/O, no internal caching.
pub trait IpCheck: Send + Sync {
    /// True if `s` is an IPv4 literal.
    fn is_v4(&self, s: &str) -> bool;

    /// True if `s` is an IPv6 literal.
    fn is_v6(&self, s: &str) -> bool;

    /// Classify `s` in one call.
    fn classify(&self, s: &str) -> IpKind {
        if self.is_v4(s) {
            IpKind::V4
        } else if self.is_v6(s) {
            IpKind::V6
        } else {
            IpKind::No
        }
    }
}

/// Recognizer backed by the standard library's address parsers.
///
/// Matches the conventional system semantics: strict dotted-quad for IPv4
/// (no octal or short forms), full IPv6 grammar including `::` compression
/// and `::ffff:a.b.c.d`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdIpCheck;

impl StdIpCheck {
    pub fn new() -> Self {
        Self
    }
}

impl IpCheck for StdIpCheck {
    fn is_v4(&self, s: &str) -> bool {
        s.parse::<Ipv4Addr>().is_ok()
    }

    fn is_v6(&self, s: &str) -> bool {
        s.parse::<Ipv6Addr>().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v4_literals() {
        let check = StdIpCheck::new();
        assert!(check.is_v4("1.2.3.4"));
        assert!(check.is_v4("0.0.0.0"));
        assert!(check.is_v4("255.255.255.255"));
        assert!(!check.is_v4("256.0.0.1"));
        assert!(!check.is_v4("1.2.3"));
        assert!(!check.is_v4("1.2.3.4.5"));
        assert!(!check.is_v4("example.com"));
        assert!(!check.is_v4("::1"));
    }

    #[test]
    fn test_v6_literals() {
        let check = StdIpCheck::new();
        assert!(check.is_v6("::1"));
        assert!(check.is_v6("::"));
        assert!(check.is_v6("2001:db8::8a2e:370:7334"));
        assert!(check.is_v6("::ffff:1.2.3.4"));
        assert!(!check.is_v6("1.2.3.4"));
        assert!(!check.is_v6("example.com"));
        assert!(!check.is_v6("2001:db8::g"));
    }

    #[test]
    fn test_classify() {
        let check = StdIpCheck::new();
        assert_eq!(check.classify("10.0.0.1"), IpKind::V4);
        assert_eq!(check.classify("fe80::1"), IpKind::V6);
        assert_eq!(check.classify("localhost"), IpKind::No);
    }
}
