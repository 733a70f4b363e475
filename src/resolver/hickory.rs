//! Async DNS resolver backed by hickory-dns.
//!
//! Issues plain A/AAAA queries and surfaces per-record TTLs. The underlying
//! resolver is shared process-wide and lazily initialized from the system's
//! DNS configuration, falling back to defaults when that cannot be read.

use super::{ResolvedAddress, Resolver, Resolving};
use crate::base::error::DnsError;
use hickory_resolver::{
    config::ResolverConfig, name_server::TokioConnectionProvider, TokioResolver,
};
use std::net::IpAddr;
use std::sync::LazyLock;

/// Network resolver using hickory-dns for A/AAAA queries.
///
/// All instances share one lazily initialized [`TokioResolver`]; hickory
/// maintains its own connection pools to the configured nameservers.
#[derive(Debug, Clone, Default)]
pub struct HickoryResolver;

impl HickoryResolver {
    pub fn new() -> Self {
        Self
    }

    fn shared() -> &'static TokioResolver {
        static RESOLVER: LazyLock<TokioResolver> = LazyLock::new(|| {
            let builder = match TokioResolver::builder_tokio() {
                Ok(builder) => {
                    tracing::debug!("using system DNS configuration");
                    builder
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read system DNS config, using defaults");
                    TokioResolver::builder_with_config(
                        ResolverConfig::default(),
                        TokioConnectionProvider::default(),
                    )
                }
            };
            builder.build()
        });
        &RESOLVER
    }
}

/// TTL shared by a lookup's records, from its cache-validity deadline.
fn remaining_ttl(valid_until: std::time::Instant) -> u32 {
    let remaining = valid_until.saturating_duration_since(std::time::Instant::now());
    remaining.as_secs().min(u64::from(u32::MAX)) as u32
}

impl Resolver for HickoryResolver {
    fn resolve_v4(&self, host: &str) -> Resolving {
        let host = host.to_string();
        Box::pin(async move {
            tracing::debug!(host = %host, "querying A records");
            let lookup = Self::shared()
                .ipv4_lookup(host.as_str())
                .await
                .map_err(|e| classify_failure(&e.to_string()))?;

            let ttl = remaining_ttl(lookup.as_lookup().valid_until());
            let records: Vec<ResolvedAddress> = lookup
                .iter()
                .map(|a| ResolvedAddress::new(IpAddr::V4(a.0), ttl))
                .collect();

            tracing::debug!(host = %host, count = records.len(), ttl, "A query complete");
            Ok(records)
        })
    }

    fn resolve_v6(&self, host: &str) -> Resolving {
        let host = host.to_string();
        Box::pin(async move {
            tracing::debug!(host = %host, "querying AAAA records");
            let lookup = Self::shared()
                .ipv6_lookup(host.as_str())
                .await
                .map_err(|e| classify_failure(&e.to_string()))?;

            let ttl = remaining_ttl(lookup.as_lookup().valid_until());
            let records: Vec<ResolvedAddress> = lookup
                .iter()
                .map(|aaaa| ResolvedAddress::new(IpAddr::V6(aaaa.0), ttl))
                .collect();

            tracing::debug!(host = %host, count = records.len(), ttl, "AAAA query complete");
            Ok(records)
        })
    }
}

/// Map a rendered hickory failure onto the error taxonomy.
///
/// hickory's concrete error kinds shift between releases; the rendered
/// message is stable enough to classify the cases the failover policy
/// cares about, and everything else is a server failure.
fn classify_failure(message: &str) -> DnsError {
    let msg = message.to_ascii_lowercase();
    if msg.contains("timeout") || msg.contains("timed out") {
        DnsError::Timeout
    } else if msg.contains("no record") || msg.contains("no records") || msg.contains("nxdomain") {
        DnsError::NotFound
    } else if msg.contains("connection refused") {
        DnsError::ConnRefused
    } else if msg.contains("refused") {
        DnsError::Refused
    } else {
        DnsError::ServFail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_timeout() {
        assert_eq!(
            classify_failure("request timed out after 5s"),
            DnsError::Timeout
        );
    }

    #[test]
    fn test_classify_no_records() {
        assert_eq!(
            classify_failure("no record found for Query { name: \"nope.test.\", query_type: A }"),
            DnsError::NotFound
        );
    }

    #[test]
    fn test_classify_refused() {
        assert_eq!(classify_failure("response code: REFUSED"), DnsError::Refused);
        assert_eq!(
            classify_failure("connection refused by 127.0.0.53:53"),
            DnsError::ConnRefused
        );
    }

    #[test]
    fn test_classify_unknown_is_servfail() {
        assert_eq!(classify_failure("io error: broken pipe"), DnsError::ServFail);
    }

    #[test]
    fn test_remaining_ttl_is_zero_for_past_deadlines() {
        let past = std::time::Instant::now() - std::time::Duration::from_secs(5);
        assert_eq!(remaining_ttl(past), 0);
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn test_resolve_known_domain() {
        let resolver = HickoryResolver::new();
        let records = resolver.resolve_v4("example.com").await;
        if let Ok(records) = records {
            assert!(records.iter().all(|r| r.addr.is_ipv4()));
        }
    }
}
