//! Cache entry model and the persisted blob format.
//!
//! Entries are keyed per `(hostname, record family)` and carry monotonic
//! freshness bounds; the persistence layer rebases those bounds onto the
//! wall clock so a reloaded cache stays meaningful across processes.

use crate::base::error::DnsError;
use crate::resolver::ResolvedAddress;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::time::Instant;

/// Entry TTL clamp bounds, in seconds.
pub const MIN_TTL_SECS: u64 = 1;
pub const MAX_TTL_SECS: u64 = 86_400;

/// The record family a cache entry covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordFamily {
    /// A records.
    V4,
    /// AAAA records.
    V6,
}

impl RecordFamily {
    pub fn number(self) -> u8 {
        match self {
            RecordFamily::V4 => 4,
            RecordFamily::V6 => 6,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            4 => Some(RecordFamily::V4),
            6 => Some(RecordFamily::V6),
            _ => None,
        }
    }
}

impl fmt::Display for RecordFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordFamily::V4 => write!(f, "A"),
            RecordFamily::V6 => write!(f, "AAAA"),
        }
    }
}

/// Cache key: lowercased hostname plus record family.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    host: Box<str>,
    family: RecordFamily,
}

impl CacheKey {
    /// Builds a key, lowercasing the hostname.
    pub fn new(host: &str, family: RecordFamily) -> Self {
        Self {
            host: host.to_ascii_lowercase().into_boxed_str(),
            family,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn family(&self) -> RecordFamily {
        self.family
    }
}

/// Success data retained inside a failure entry.
///
/// When a failure overwrites a success for the same key, the success's
/// addresses and freshness bounds survive here so the expired-cache policy
/// still has data to serve.
#[derive(Debug, Clone)]
pub struct StaleAddrs {
    pub addrs: Vec<ResolvedAddress>,
    pub fetched_at: Instant,
    pub expires_at: Instant,
}

/// What a cache entry holds.
#[derive(Debug, Clone)]
pub enum EntryKind {
    Success {
        addrs: Vec<ResolvedAddress>,
    },
    Failure {
        error: DnsError,
        last_good: Option<StaleAddrs>,
    },
}

/// One cached resolution outcome.
///
/// Freshness is an invariant of `fetched_at`/`expires_at` on the monotonic
/// clock; the store applies no TTL logic of its own. The rotation index
/// backs round-robin selection and is the only mutable field.
#[derive(Debug)]
pub struct CacheEntry {
    pub kind: EntryKind,
    pub fetched_at: Instant,
    pub expires_at: Instant,
    rotation: AtomicUsize,
}

impl CacheEntry {
    /// Builds a success entry; the TTL is the minimum record TTL clamped to
    /// `[MIN_TTL_SECS, MAX_TTL_SECS]`.
    pub fn success(addrs: Vec<ResolvedAddress>, fetched_at: Instant) -> Self {
        let min_ttl = addrs
            .iter()
            .map(|r| u64::from(r.ttl_secs))
            .min()
            .unwrap_or(MIN_TTL_SECS)
            .clamp(MIN_TTL_SECS, MAX_TTL_SECS);
        Self {
            kind: EntryKind::Success { addrs },
            fetched_at,
            expires_at: fetched_at + Duration::from_secs(min_ttl),
            rotation: AtomicUsize::new(0),
        }
    }

    /// Builds a failure entry, retaining `last_good` success data if any.
    pub fn failure(
        error: DnsError,
        last_good: Option<StaleAddrs>,
        fetched_at: Instant,
        ttl: Duration,
    ) -> Self {
        Self {
            kind: EntryKind::Failure { error, last_good },
            fetched_at,
            expires_at: fetched_at + ttl,
            rotation: AtomicUsize::new(0),
        }
    }

    pub fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    pub fn is_success(&self) -> bool {
        matches!(self.kind, EntryKind::Success { .. })
    }

    /// The rotation counter backing round-robin selection over this entry's
    /// addresses. Advanced with an atomic fetch-add, so concurrent callers
    /// never lose increments.
    pub fn rotation(&self) -> &AtomicUsize {
        &self.rotation
    }

    /// Success addresses to fall back on when this entry is past expiry:
    /// the entry's own addresses for a success, or the retained `last_good`
    /// of a failure. Returns the addresses with their expiry.
    pub fn stale_success(&self) -> Option<(&[ResolvedAddress], Instant)> {
        match &self.kind {
            EntryKind::Success { addrs } => Some((addrs, self.expires_at)),
            EntryKind::Failure { last_good, .. } => last_good
                .as_ref()
                .map(|lg| (lg.addrs.as_slice(), lg.expires_at)),
        }
    }

    /// Success data of this entry viewed as a stale companion for a
    /// subsequent failure entry.
    pub fn carry_forward(&self) -> Option<StaleAddrs> {
        match &self.kind {
            EntryKind::Success { addrs } => Some(StaleAddrs {
                addrs: addrs.clone(),
                fetched_at: self.fetched_at,
                expires_at: self.expires_at,
            }),
            EntryKind::Failure { last_good, .. } => last_good.clone(),
        }
    }
}

// -- persisted blob -------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct PersistedCache {
    entries: Vec<PersistedEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedEntry {
    host: String,
    family: u8,
    fetched_unix_ms: i64,
    expires_unix_ms: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    addresses: Vec<PersistedAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_good: Option<PersistedStale>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedAddress {
    address: IpAddr,
    ttl: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedStale {
    addresses: Vec<PersistedAddress>,
    fetched_unix_ms: i64,
    expires_unix_ms: i64,
}

fn now_unix_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

fn to_unix_ms(at: Instant, now: Instant, now_unix: i64) -> i64 {
    if at >= now {
        now_unix + (at - now).as_millis() as i64
    } else {
        now_unix - (now - at).as_millis() as i64
    }
}

/// Rebase a wall-clock timestamp onto the monotonic clock. `None` when the
/// timestamp predates the earliest representable instant; such records are
/// older than the expired-cache policy could ever bridge and are dropped.
fn from_unix_ms(unix_ms: i64, now_unix: i64, now: Instant) -> Option<Instant> {
    if unix_ms >= now_unix {
        Some(now + Duration::from_millis((unix_ms - now_unix) as u64))
    } else {
        let behind = Duration::from_millis((now_unix - unix_ms) as u64);
        now.checked_sub(behind)
    }
}

fn persist_addrs(addrs: &[ResolvedAddress]) -> Vec<PersistedAddress> {
    addrs
        .iter()
        .map(|r| PersistedAddress {
            address: r.addr,
            ttl: r.ttl_secs,
        })
        .collect()
}

fn restore_addrs(addrs: &[PersistedAddress]) -> Vec<ResolvedAddress> {
    addrs
        .iter()
        .map(|p| ResolvedAddress::new(p.address, p.ttl))
        .collect()
}

/// Serialize cache entries into the persisted blob.
pub fn dump_entries(entries: &[(CacheKey, Arc<CacheEntry>)]) -> Result<Vec<u8>, DnsError> {
    let now = Instant::now();
    let now_unix = now_unix_ms();

    let persisted = PersistedCache {
        entries: entries
            .iter()
            .map(|(key, entry)| {
                let (addresses, error_code, last_good) = match &entry.kind {
                    EntryKind::Success { addrs } => (persist_addrs(addrs), None, None),
                    EntryKind::Failure { error, last_good } => (
                        Vec::new(),
                        Some(error.code().to_string()),
                        last_good.as_ref().map(|lg| PersistedStale {
                            addresses: persist_addrs(&lg.addrs),
                            fetched_unix_ms: to_unix_ms(lg.fetched_at, now, now_unix),
                            expires_unix_ms: to_unix_ms(lg.expires_at, now, now_unix),
                        }),
                    ),
                };
                PersistedEntry {
                    host: key.host().to_string(),
                    family: key.family().number(),
                    fetched_unix_ms: to_unix_ms(entry.fetched_at, now, now_unix),
                    expires_unix_ms: to_unix_ms(entry.expires_at, now, now_unix),
                    addresses,
                    error_code,
                    last_good,
                }
            })
            .collect(),
    };

    serde_json::to_vec(&persisted).map_err(|e| DnsError::Storage(e.to_string()))
}

/// Deserialize the persisted blob back into cache entries.
///
/// Entries past their expiry load as stale (usable through the
/// expired-cache policy). Failure records with an unknown error code are
/// skipped.
pub fn hydrate_entries(blob: &[u8]) -> Result<Vec<(CacheKey, Arc<CacheEntry>)>, DnsError> {
    let persisted: PersistedCache =
        serde_json::from_slice(blob).map_err(|e| DnsError::Storage(e.to_string()))?;
    let now = Instant::now();
    let now_unix = now_unix_ms();

    let mut out = Vec::with_capacity(persisted.entries.len());
    for record in persisted.entries {
        let Some(family) = RecordFamily::from_number(record.family) else {
            tracing::warn!(host = %record.host, family = record.family, "skipping persisted entry with unknown family");
            continue;
        };
        let key = CacheKey::new(&record.host, family);
        let Some(expires_at) = from_unix_ms(record.expires_unix_ms, now_unix, now) else {
            tracing::debug!(host = %record.host, "skipping persisted entry expired beyond representable age");
            continue;
        };
        let fetched_at =
            from_unix_ms(record.fetched_unix_ms, now_unix, now).unwrap_or(expires_at);

        let kind = if let Some(code) = record.error_code {
            let Some(error) = DnsError::from_code(&code) else {
                tracing::warn!(host = %record.host, code = %code, "skipping persisted failure with unknown code");
                continue;
            };
            let last_good = record.last_good.and_then(|lg| {
                let expires_at = from_unix_ms(lg.expires_unix_ms, now_unix, now)?;
                Some(StaleAddrs {
                    addrs: restore_addrs(&lg.addresses),
                    fetched_at: from_unix_ms(lg.fetched_unix_ms, now_unix, now)
                        .unwrap_or(expires_at),
                    expires_at,
                })
            });
            EntryKind::Failure { error, last_good }
        } else {
            EntryKind::Success {
                addrs: restore_addrs(&record.addresses),
            }
        };

        out.push((
            key,
            Arc::new(CacheEntry {
                kind,
                fetched_at,
                expires_at: expires_at.max(fetched_at),
                rotation: AtomicUsize::new(0),
            }),
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn addr(s: &str, ttl: u32) -> ResolvedAddress {
        ResolvedAddress::new(s.parse().unwrap(), ttl)
    }

    #[tokio::test]
    async fn test_success_ttl_is_min_of_records() {
        let now = Instant::now();
        let entry = CacheEntry::success(vec![addr("1.2.3.4", 300), addr("5.6.7.8", 60)], now);
        assert_eq!(entry.expires_at - entry.fetched_at, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_ttl_clamped_to_bounds() {
        let now = Instant::now();
        let low = CacheEntry::success(vec![addr("1.2.3.4", 0)], now);
        assert_eq!(low.expires_at - low.fetched_at, Duration::from_secs(1));

        let high = CacheEntry::success(vec![addr("1.2.3.4", 1_000_000)], now);
        assert_eq!(
            high.expires_at - high.fetched_at,
            Duration::from_secs(86_400)
        );
    }

    #[tokio::test]
    async fn test_freshness_window() {
        let now = Instant::now();
        let entry = CacheEntry::success(vec![addr("1.2.3.4", 10)], now);
        assert!(entry.is_fresh(now));
        assert!(entry.is_fresh(now + Duration::from_secs(9)));
        assert!(!entry.is_fresh(now + Duration::from_secs(10)));
    }

    #[tokio::test]
    async fn test_failure_carries_last_good() {
        let now = Instant::now();
        let success = CacheEntry::success(vec![addr("1.1.1.1", 10)], now);
        let carried = success.carry_forward().unwrap();
        let failure = CacheEntry::failure(
            DnsError::Timeout,
            Some(carried),
            now + Duration::from_secs(11),
            Duration::from_secs(1),
        );

        let (addrs, expired_at) = failure.stale_success().unwrap();
        assert_eq!(addrs[0].addr, IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)));
        assert_eq!(expired_at, now + Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_blob_round_trip() {
        let now = Instant::now();
        let entries = vec![
            (
                CacheKey::new("Example.COM", RecordFamily::V4),
                Arc::new(CacheEntry::success(vec![addr("1.2.3.4", 60)], now)),
            ),
            (
                CacheKey::new("broken.test", RecordFamily::V6),
                Arc::new(CacheEntry::failure(
                    DnsError::ServFail,
                    None,
                    now,
                    Duration::from_secs(1),
                )),
            ),
        ];

        let blob = dump_entries(&entries).unwrap();
        let restored = hydrate_entries(&blob).unwrap();
        assert_eq!(restored.len(), 2);

        let (key, entry) = &restored[0];
        assert_eq!(key.host(), "example.com");
        assert_eq!(key.family(), RecordFamily::V4);
        match &entry.kind {
            EntryKind::Success { addrs } => {
                assert_eq!(addrs, &vec![addr("1.2.3.4", 60)]);
            }
            other => panic!("expected success, got {other:?}"),
        }

        let (_, failure) = &restored[1];
        match &failure.kind {
            EntryKind::Failure { error, .. } => assert_eq!(*error, DnsError::ServFail),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_hydrate_skips_unknown_error_code() {
        let blob = br#"{"entries":[{"host":"a.test","family":4,"fetched_unix_ms":0,"expires_unix_ms":0,"error_code":"EAI_WEIRD"}]}"#;
        let restored = hydrate_entries(blob).unwrap();
        assert!(restored.is_empty());
    }

    #[tokio::test]
    async fn test_hydrate_rejects_garbage() {
        assert!(matches!(
            hydrate_entries(b"not json"),
            Err(DnsError::Storage(_))
        ));
    }
}
