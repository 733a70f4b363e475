//! Failover policy.
//!
//! Decides, per resolver error, whether the failure is worth caching and
//! whether expired success data may be served in its place. Policies match
//! on the conventional textual codes carried by [`DnsError`].

use crate::base::error::DnsError;
use std::collections::HashSet;
use std::time::Duration;

/// Trait for failover decisions.
pub trait FailoverStrategy: Send + Sync {
    /// Should `error` be cached as a negative entry? Returns the failure
    /// TTL when it should.
    fn cache_resolver_failure(&self, error: &DnsError, host: &str) -> Option<Duration>;

    /// May expired success data be served instead of surfacing `error`?
    /// Returns the maximum time past expiry the data may be.
    fn use_expired_cache(&self, error: &DnsError, host: &str) -> Option<Duration>;
}

/// Error codes the default policy treats as transient enough to cache and
/// to bridge with stale data.
const DEFAULT_CODES: [&str; 5] = ["CONNREFUSED", "NOTFOUND", "REFUSED", "SERVFAIL", "TIMEOUT"];

/// Default failure-entry TTL.
pub const DEFAULT_CACHE_ERROR_TTL: Duration = Duration::from_millis(1000);

/// Default ceiling on how far past expiry stale data may be served (1 hour).
pub const DEFAULT_MAX_EXPIRATION: Duration = Duration::from_millis(3_600_000);

/// The universal policy: one code set for both decisions.
pub struct UniversalFailover {
    cache_error_codes: HashSet<&'static str>,
    cache_error_ttl: Duration,
    expired_cache_codes: HashSet<&'static str>,
    max_expiration: Duration,
}

impl UniversalFailover {
    pub fn new() -> Self {
        Self {
            cache_error_codes: DEFAULT_CODES.into_iter().collect(),
            cache_error_ttl: DEFAULT_CACHE_ERROR_TTL,
            expired_cache_codes: DEFAULT_CODES.into_iter().collect(),
            max_expiration: DEFAULT_MAX_EXPIRATION,
        }
    }

    /// Override the set of codes whose failures are cached.
    pub fn cache_error_codes(mut self, codes: impl IntoIterator<Item = &'static str>) -> Self {
        self.cache_error_codes = codes.into_iter().collect();
        self
    }

    /// Override the failure-entry TTL.
    pub fn cache_error_ttl(mut self, ttl: Duration) -> Self {
        self.cache_error_ttl = ttl;
        self
    }

    /// Override the set of codes eligible for stale fallback.
    pub fn expired_cache_codes(mut self, codes: impl IntoIterator<Item = &'static str>) -> Self {
        self.expired_cache_codes = codes.into_iter().collect();
        self
    }

    /// Override the stale-fallback ceiling.
    pub fn max_expiration(mut self, max: Duration) -> Self {
        self.max_expiration = max;
        self
    }
}

impl Default for UniversalFailover {
    fn default() -> Self {
        Self::new()
    }
}

impl FailoverStrategy for UniversalFailover {
    fn cache_resolver_failure(&self, error: &DnsError, host: &str) -> Option<Duration> {
        if self.cache_error_codes.contains(error.code()) {
            tracing::debug!(host = %host, code = error.code(), "caching resolver failure");
            Some(self.cache_error_ttl)
        } else {
            None
        }
    }

    fn use_expired_cache(&self, error: &DnsError, host: &str) -> Option<Duration> {
        if self.expired_cache_codes.contains(error.code()) {
            tracing::debug!(host = %host, code = error.code(), "expired cache eligible");
            Some(self.max_expiration)
        } else {
            None
        }
    }
}
