//! Connection-agent installation seam.
//!
//! Higher-level connection agents (HTTP clients, socket pools, UDP stacks)
//! consume a hostname-to-addresses callable; this module defines that
//! callable shape and implements it for [`HostResolver`], so the caching
//! engine drops in wherever a plain resolver would.

use crate::base::error::DnsError;
use crate::lookup::{HostResolver, LookupOptions};
use std::{fmt, future::Future, net::SocketAddr, pin::Pin, sync::Arc};

/// A domain name to resolve into IP addresses.
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct Name {
    host: Box<str>,
}

impl Name {
    #[inline]
    pub fn new(host: impl Into<Box<str>>) -> Self {
        Self { host: host.into() }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.host
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Name::new(value)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.host, f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.host, f)
    }
}

/// Alias for an `Iterator` trait object over `SocketAddr`.
pub type Addrs = Box<dyn Iterator<Item = SocketAddr> + Send>;

/// Alias for the `Future` type returned by [`Resolve::resolve`].
pub type Resolving = Pin<Box<dyn Future<Output = Result<Addrs, DnsError>> + Send>>;

/// The callable shape connection agents install.
///
/// Resolved addresses carry port 0; agents set the target service's port.
pub trait Resolve: Send + Sync {
    fn resolve(&self, name: Name) -> Resolving;
}

impl<R: Resolve + ?Sized> Resolve for Arc<R> {
    fn resolve(&self, name: Name) -> Resolving {
        (**self).resolve(name)
    }
}

impl Resolve for HostResolver {
    /// Full cached lookup (every candidate, default family and ordering),
    /// delivered as a `SocketAddr` iterator.
    fn resolve(&self, name: Name) -> Resolving {
        let resolver = self.clone();
        Box::pin(async move {
            let answer = resolver
                .lookup(name.as_str(), LookupOptions::new().all(true))
                .await?;
            let addrs: Vec<SocketAddr> = answer
                .into_vec()
                .into_iter()
                .map(|a| SocketAddr::new(a.address, 0))
                .collect();
            Ok(Box::new(addrs.into_iter()) as Addrs)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_api() {
        let name = Name::new("example.com");
        assert_eq!(name.as_str(), "example.com");
        assert_eq!(name.to_string(), "example.com");
        assert_eq!(Name::from("example.com"), name);
    }

    #[test]
    fn test_name_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(Name::new("example.com"));
        set.insert(Name::new("example.com"));
        assert_eq!(set.len(), 1);
    }
}
