//! The lookup controller.
//!
//! Composes the IP-literal recognizer, hosts overlay, cache store, network
//! resolver, throttle, failover policy, and selection strategy into a
//! host-resolution call compatible with a system resolver: hostname plus
//! options in, one or all addresses out.
//!
//! # Example
//!
//! ```rust,ignore
//! use hostcache::lookup::{HostResolver, LookupOptions};
//!
//! let resolver = HostResolver::new()?;
//! resolver.bootstrap().await?;
//! let answer = resolver.lookup("example.com", LookupOptions::new()).await?;
//! ```

pub mod agent;
pub mod entry;
pub mod netcfg;
pub mod options;

mod flight;

pub use agent::{Addrs, Name, Resolve, Resolving};
pub use options::{Family, LookupOptions, Order};

use crate::base::error::DnsError;
use crate::cache::{CacheStore, LruStore};
use crate::failover::{FailoverStrategy, UniversalFailover};
use crate::hosts::{HostsFile, HostsSource};
use crate::ip::{IpCheck, IpKind, StdIpCheck};
use crate::persist::PersistentStore;
use crate::resolver::{HickoryResolver, Resolver};
use crate::select::{ChoiceStrategy, RoundRobin};
use crate::throttle::Throttle;

use entry::{CacheEntry, CacheKey, EntryKind, RecordFamily};
use flight::{FlightGuard, FlightTable};
use futures::FutureExt;
use lru::LruCache;
use netcfg::InterfaceProbe;
use options::{hints, Resolved};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::Instant;

/// Bound on the IP-literal memo bucket.
const IP_MEMO_CAPACITY: usize = 1000;

/// One shaped answer address with its numeric family (4 or 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupAddr {
    pub address: IpAddr,
    pub family: u8,
}

impl LookupAddr {
    pub fn from_ip(address: IpAddr) -> Self {
        let family = match address {
            IpAddr::V4(_) => 4,
            IpAddr::V6(_) => 6,
        };
        Self { address, family }
    }
}

/// Result of a lookup call: one address or the whole shaped list,
/// depending on `options.all`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupAnswer {
    One(LookupAddr),
    Many(Vec<LookupAddr>),
}

impl LookupAnswer {
    /// The answer as a list (a single answer becomes one element).
    pub fn into_vec(self) -> Vec<LookupAddr> {
        match self {
            LookupAnswer::One(addr) => vec![addr],
            LookupAnswer::Many(addrs) => addrs,
        }
    }

    /// The single answer, when `all` was false.
    pub fn single(&self) -> Option<LookupAddr> {
        match self {
            LookupAnswer::One(addr) => Some(*addr),
            LookupAnswer::Many(_) => None,
        }
    }
}

/// Hostname entry from the hosts-file snapshot.
struct HostsRecord {
    v4: Vec<IpAddr>,
    v6: Vec<IpAddr>,
    rotation: AtomicUsize,
}

/// Immutable hosts-file view, swapped whole on every change.
#[derive(Default)]
struct HostsSnapshot {
    records: HashMap<String, HostsRecord>,
}

fn build_snapshot(pairs: Vec<(String, IpAddr)>) -> HostsSnapshot {
    let mut records: HashMap<String, HostsRecord> = HashMap::new();
    for (host, addr) in pairs {
        let record = records.entry(host).or_insert_with(|| HostsRecord {
            v4: Vec::new(),
            v6: Vec::new(),
            rotation: AtomicUsize::new(0),
        });
        match addr {
            IpAddr::V4(_) => record.v4.push(addr),
            IpAddr::V6(_) => record.v6.push(addr),
        }
    }
    HostsSnapshot { records }
}

/// Candidate addresses one family contributed, with the cache entry that
/// owns their rotation counter.
struct FamilyHit {
    ips: Vec<IpAddr>,
    entry: Arc<CacheEntry>,
}

impl FamilyHit {
    fn from_entry(entry: Arc<CacheEntry>) -> Self {
        let ips = match &entry.kind {
            EntryKind::Success { addrs } => addrs.iter().map(|r| r.addr).collect(),
            EntryKind::Failure { .. } => Vec::new(),
        };
        Self { ips, entry }
    }
}

struct Inner {
    cache: Arc<dyn CacheStore>,
    resolver: Arc<dyn Resolver>,
    hosts: Arc<dyn HostsSource>,
    ip_check: Arc<dyn IpCheck>,
    choice: Arc<dyn ChoiceStrategy>,
    failover: Arc<dyn FailoverStrategy>,
    throttle: Option<Arc<dyn Throttle>>,
    storage: Option<Arc<dyn PersistentStore>>,
    probe: InterfaceProbe,
    snapshot: RwLock<Arc<HostsSnapshot>>,
    flights: Arc<FlightTable>,
    ip_memo: Mutex<LruCache<String, IpKind>>,
    bootstrapped: AtomicBool,
}

impl Inner {
    fn install_hosts(&self, pairs: Vec<(String, IpAddr)>) {
        let count = pairs.len();
        *self.snapshot.write() = Arc::new(build_snapshot(pairs));
        tracing::debug!(mappings = count, "hosts snapshot installed");
    }

    fn reload_hosts(self: &Arc<Self>) {
        match self.hosts.read() {
            Ok(pairs) => self.install_hosts(pairs),
            Err(e) => {
                tracing::warn!(error = %e, "hosts reload failed, keeping previous snapshot");
            }
        }
    }
}

/// The caching lookup engine.
///
/// Cheap to clone; all clones share state. Collaborators are supplied
/// through [`HostResolverBuilder`], each defaulting to the standard
/// implementation from this crate.
#[derive(Clone)]
pub struct HostResolver {
    inner: Arc<Inner>,
}

impl HostResolver {
    /// Engine with every collaborator defaulted.
    pub fn new() -> Result<Self, DnsError> {
        Self::builder().build()
    }

    pub fn builder() -> HostResolverBuilder {
        HostResolverBuilder::new()
    }

    /// Prepare the engine: hydrate the cache from persistent storage (read
    /// and parse failures are logged and swallowed), then start the hosts
    /// watcher and install the initial snapshot (failures surface).
    ///
    /// Idempotent; a failed bootstrap may be retried.
    pub async fn bootstrap(&self) -> Result<(), DnsError> {
        if self.inner.bootstrapped.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        if let Some(storage) = &self.inner.storage {
            match storage.read() {
                Ok(Some(blob)) => match entry::hydrate_entries(&blob) {
                    Ok(entries) => {
                        let count = entries.len();
                        for (key, cached) in entries {
                            self.inner.cache.set(key, cached);
                        }
                        tracing::debug!(entries = count, "cache hydrated from storage");
                    }
                    Err(e) => tracing::warn!(error = %e, "ignoring unparseable cache blob"),
                },
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "cache blob read failed"),
            }
        }

        let weak = Arc::downgrade(&self.inner);
        let result = self
            .inner
            .hosts
            .watch(Arc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.reload_hosts();
                }
            }))
            .and_then(|()| self.inner.hosts.read())
            .map(|pairs| self.inner.install_hosts(pairs));

        if let Err(e) = result {
            self.inner.bootstrapped.store(false, Ordering::SeqCst);
            return Err(e);
        }
        Ok(())
    }

    /// Stop watching the hosts file and, when persistence is configured,
    /// flush the cache. Write failures surface; safe without a prior
    /// bootstrap.
    pub async fn teardown(&self) -> Result<(), DnsError> {
        if self.inner.bootstrapped.swap(false, Ordering::SeqCst) {
            self.inner.hosts.stop_watching();
        }
        if let Some(storage) = &self.inner.storage {
            let blob = entry::dump_entries(&self.inner.cache.entries())?;
            storage
                .write(&blob)
                .map_err(|e| DnsError::Storage(e.to_string()))?;
        }
        Ok(())
    }

    /// Resolve `host` per `options`.
    ///
    /// IP literals and hosts-file mappings answer without touching DNS;
    /// everything else goes through the TTL-aware cache, coalesced and
    /// throttled network resolution, and the failover policy.
    pub async fn lookup(
        &self,
        host: &str,
        options: LookupOptions,
    ) -> Result<LookupAnswer, DnsError> {
        let opts = options.normalize()?;

        match self.ip_kind(host) {
            IpKind::V4 => return self.literal_v4(host, &opts),
            IpKind::V6 => return self.literal_v6(host, &opts),
            IpKind::No => {}
        }

        let host_lower = host.to_ascii_lowercase();

        let snapshot = self.inner.snapshot.read().clone();
        if let Some(record) = snapshot.records.get(&host_lower) {
            tracing::debug!(host = %host_lower, "answered from hosts overlay");
            let (v4, v6) = hosts_view(record, &opts);
            let candidates = shape(v4, v6, opts.order);
            return self.finish(candidates, &record.rotation, &opts);
        }

        self.dns_lookup(&host_lower, &opts).await
    }

    /// Callback-style delivery of [`lookup`](Self::lookup); the work runs
    /// in a spawned task.
    pub fn lookup_callback<F>(&self, host: &str, options: LookupOptions, callback: F)
    where
        F: FnOnce(Result<LookupAnswer, DnsError>) + Send + 'static,
    {
        let this = self.clone();
        let host = host.to_string();
        tokio::spawn(async move {
            callback(this.lookup(&host, options).await);
        });
    }

    // -- pipeline internals ------------------------------------------------

    fn ip_kind(&self, host: &str) -> IpKind {
        let mut memo = self.inner.ip_memo.lock();
        if let Some(kind) = memo.get(host) {
            return *kind;
        }
        let kind = self.inner.ip_check.classify(host);
        memo.put(host.to_string(), kind);
        kind
    }

    fn literal_v4(&self, host: &str, opts: &Resolved) -> Result<LookupAnswer, DnsError> {
        let addr: Ipv4Addr = host.parse().map_err(|_| DnsError::NotFound)?;
        let ip = match opts.family {
            Family::Any | Family::V4 => IpAddr::V4(addr),
            Family::V6 if opts.has_hint(hints::V4MAPPED) => IpAddr::V6(addr.to_ipv6_mapped()),
            Family::V6 => return Err(DnsError::NotFound),
        };
        self.finish(vec![LookupAddr::from_ip(ip)], &AtomicUsize::new(0), opts)
    }

    fn literal_v6(&self, host: &str, opts: &Resolved) -> Result<LookupAnswer, DnsError> {
        let addr: Ipv6Addr = host.parse().map_err(|_| DnsError::NotFound)?;
        match opts.family {
            Family::Any | Family::V6 => self.finish(
                vec![LookupAddr::from_ip(IpAddr::V6(addr))],
                &AtomicUsize::new(0),
                opts,
            ),
            Family::V4 => Err(DnsError::NotFound),
        }
    }

    /// Families step 4 requires, intersected with local availability when
    /// `ADDRCONFIG` is set.
    fn required_families(&self, opts: &Resolved) -> Result<Vec<RecordFamily>, DnsError> {
        let base: &[RecordFamily] = match opts.family {
            Family::V4 => &[RecordFamily::V4],
            Family::V6 => &[RecordFamily::V6],
            Family::Any => &[RecordFamily::V4, RecordFamily::V6],
        };
        if !opts.has_hint(hints::ADDRCONFIG) {
            return Ok(base.to_vec());
        }
        let (v4_up, v6_up) = (self.inner.probe)();
        let filtered: Vec<RecordFamily> = base
            .iter()
            .copied()
            .filter(|family| match family {
                RecordFamily::V4 => v4_up,
                RecordFamily::V6 => v6_up,
            })
            .collect();
        if filtered.is_empty() {
            return Err(DnsError::NotFound);
        }
        Ok(filtered)
    }

    async fn dns_lookup(&self, host: &str, opts: &Resolved) -> Result<LookupAnswer, DnsError> {
        let families = self.required_families(opts)?;

        if opts.family == Family::V6 && opts.has_hint(hints::V4MAPPED) {
            return self.dns_lookup_v4mapped(host, opts).await;
        }

        let mut v4_result = None;
        let mut v6_result = None;
        if families.contains(&RecordFamily::V4) && families.contains(&RecordFamily::V6) {
            let (a, aaaa) = tokio::join!(
                self.fetch_family(host, RecordFamily::V4),
                self.fetch_family(host, RecordFamily::V6)
            );
            v4_result = Some(a);
            v6_result = Some(aaaa);
        } else if families.contains(&RecordFamily::V4) {
            v4_result = Some(self.fetch_family(host, RecordFamily::V4).await);
        } else {
            v6_result = Some(self.fetch_family(host, RecordFamily::V6).await);
        }

        let mut v4_ips = Vec::new();
        let mut v6_ips = Vec::new();
        let mut rotation_owner: Option<Arc<CacheEntry>> = None;
        let mut first_err: Option<DnsError> = None;
        let mut any_ok = false;

        for (family, result) in [
            (RecordFamily::V4, v4_result),
            (RecordFamily::V6, v6_result),
        ] {
            match result {
                Some(Ok(hit)) => {
                    any_ok = true;
                    if rotation_owner.is_none() {
                        rotation_owner = Some(hit.entry.clone());
                    }
                    match family {
                        RecordFamily::V4 => v4_ips = hit.ips,
                        RecordFamily::V6 => v6_ips = hit.ips,
                    }
                }
                Some(Err(e)) => {
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
                None => {}
            }
        }

        if !any_ok {
            return Err(first_err.unwrap_or(DnsError::NotFound));
        }

        let candidates = shape(v4_ips, v6_ips, opts.order);
        match rotation_owner {
            Some(owner) => self.finish(candidates, owner.rotation(), opts),
            None => Err(DnsError::NotFound),
        }
    }

    /// `family = 6` with `V4MAPPED`: AAAA first; when it yields nothing, A
    /// records are fetched and mapped into IPv6 space. With `ALL`, both
    /// AAAA and mapped A results are returned.
    async fn dns_lookup_v4mapped(
        &self,
        host: &str,
        opts: &Resolved,
    ) -> Result<LookupAnswer, DnsError> {
        match self.fetch_family(host, RecordFamily::V6).await {
            Ok(hit) => {
                let mut ips = hit.ips;
                if opts.has_hint(hints::ALL) {
                    if let Ok(v4_hit) = self.fetch_family(host, RecordFamily::V4).await {
                        ips.extend(v4_hit.ips.into_iter().map(map_to_v6));
                    }
                }
                let candidates = ips.into_iter().map(LookupAddr::from_ip).collect();
                self.finish(candidates, hit.entry.rotation(), opts)
            }
            Err(aaaa_err) => match self.fetch_family(host, RecordFamily::V4).await {
                Ok(v4_hit) => {
                    let candidates = v4_hit
                        .ips
                        .into_iter()
                        .map(|ip| LookupAddr::from_ip(map_to_v6(ip)))
                        .collect();
                    self.finish(candidates, v4_hit.entry.rotation(), opts)
                }
                Err(_) => Err(aaaa_err),
            },
        }
    }

    /// Step-5 decision tree for one `(host, family)` key.
    async fn fetch_family(&self, host: &str, family: RecordFamily) -> Result<FamilyHit, DnsError> {
        let key = CacheKey::new(host, family);
        let now = Instant::now();

        match self.inner.cache.get(&key) {
            None => {
                let fresh = self.resolve_family(key).await?;
                Ok(FamilyHit::from_entry(fresh))
            }
            Some(cached) if cached.is_fresh(now) => match &cached.kind {
                EntryKind::Success { .. } => Ok(FamilyHit::from_entry(cached.clone())),
                EntryKind::Failure { error, .. } => {
                    // Stale precedence: retained success data eligible under
                    // the policy beats the cached failure.
                    let error = error.clone();
                    if let Some(hit) = self.stale_fallback(&cached, &error, host, now) {
                        return Ok(hit);
                    }
                    Err(error)
                }
            },
            Some(cached) => match self.resolve_family(key).await {
                Ok(fresh) => Ok(FamilyHit::from_entry(fresh)),
                Err(err) => {
                    if let Some(hit) = self.stale_fallback(&cached, &err, host, now) {
                        return Ok(hit);
                    }
                    Err(err)
                }
            },
        }
    }

    /// Expired success data for `entry`, when the policy allows serving it
    /// in place of `error` and it is not too far past expiry.
    fn stale_fallback(
        &self,
        cached: &Arc<CacheEntry>,
        error: &DnsError,
        host: &str,
        now: Instant,
    ) -> Option<FamilyHit> {
        let (addrs, expired_at) = cached.stale_success()?;
        let max_expiration = self.inner.failover.use_expired_cache(error, host)?;
        if now.saturating_duration_since(expired_at) > max_expiration {
            return None;
        }
        tracing::debug!(host = %host, code = error.code(), "serving expired cache data");
        Some(FamilyHit {
            ips: addrs.iter().map(|r| r.addr).collect(),
            entry: cached.clone(),
        })
    }

    /// Single-flight entry point: joins the in-flight resolution for `key`
    /// or starts one in a spawned task.
    async fn resolve_family(&self, key: CacheKey) -> Result<Arc<CacheEntry>, DnsError> {
        let this = self.clone();
        let table = self.inner.flights.clone();
        let task_key = key.clone();
        self.inner
            .flights
            .join(&key, move || {
                let guard = FlightGuard::new(table, task_key.clone());
                async move {
                    // Slot released after the cache write, panic included.
                    let _guard = guard;
                    this.resolve_and_store(task_key).await
                }
                .boxed()
            })
            .await
    }

    /// The resolve subroutine: throttled network query, TTL bookkeeping,
    /// failure caching per policy.
    async fn resolve_and_store(&self, key: CacheKey) -> Result<Arc<CacheEntry>, DnsError> {
        if let Some(throttle) = &self.inner.throttle {
            throttle.acquire().await;
        }

        let result = match key.family() {
            RecordFamily::V4 => self.inner.resolver.resolve_v4(key.host()).await,
            RecordFamily::V6 => self.inner.resolver.resolve_v6(key.host()).await,
        };
        let now = Instant::now();

        match result {
            Ok(records) if !records.is_empty() => {
                let cached = Arc::new(CacheEntry::success(records, now));
                self.inner.cache.set(key.clone(), cached.clone());
                tracing::debug!(host = key.host(), family = %key.family(), "resolution cached");
                Ok(cached)
            }
            Ok(_) => self.store_failure(key, DnsError::NoData, now),
            Err(err) => self.store_failure(key, err, now),
        }
    }

    fn store_failure(
        &self,
        key: CacheKey,
        err: DnsError,
        now: Instant,
    ) -> Result<Arc<CacheEntry>, DnsError> {
        if let Some(ttl) = self.inner.failover.cache_resolver_failure(&err, key.host()) {
            // A failure overwriting success data keeps that data around for
            // the expired-cache policy.
            let last_good = self
                .inner
                .cache
                .get(&key)
                .and_then(|previous| previous.carry_forward());
            let cached = Arc::new(CacheEntry::failure(err.clone(), last_good, now, ttl));
            self.inner.cache.set(key, cached);
        }
        Err(err)
    }

    /// Step 7 tail: reject empty candidates, then deliver all of them or
    /// reduce to one via the selection strategy.
    fn finish(
        &self,
        candidates: Vec<LookupAddr>,
        rotation: &AtomicUsize,
        opts: &Resolved,
    ) -> Result<LookupAnswer, DnsError> {
        if candidates.is_empty() {
            return Err(DnsError::NotFound);
        }
        if opts.all {
            return Ok(LookupAnswer::Many(candidates));
        }
        let picked = self
            .inner
            .choice
            .choose_one(&candidates, rotation)
            .map_err(|e| match e {
                // Selection never sees an empty list; keep the internal
                // code from escaping regardless of the strategy.
                DnsError::EmptyArray => DnsError::NotFound,
                other => other,
            })?;
        Ok(LookupAnswer::One(picked))
    }
}

/// Hosts-overlay candidates for the requested family and hints.
fn hosts_view(record: &HostsRecord, opts: &Resolved) -> (Vec<IpAddr>, Vec<IpAddr>) {
    match opts.family {
        Family::V4 => (record.v4.clone(), Vec::new()),
        Family::Any => (record.v4.clone(), record.v6.clone()),
        Family::V6 => {
            if !record.v6.is_empty() {
                let mut v6 = record.v6.clone();
                if opts.has_hint(hints::V4MAPPED) && opts.has_hint(hints::ALL) {
                    v6.extend(record.v4.iter().copied().map(map_to_v6));
                }
                (Vec::new(), v6)
            } else if opts.has_hint(hints::V4MAPPED) {
                (
                    Vec::new(),
                    record.v4.iter().copied().map(map_to_v6).collect(),
                )
            } else {
                (Vec::new(), Vec::new())
            }
        }
    }
}

/// Concatenate per-family lists in the requested order. Verbatim keeps
/// fetch order: A results, then AAAA results.
fn shape(v4: Vec<IpAddr>, v6: Vec<IpAddr>, order: Order) -> Vec<LookupAddr> {
    let (first, second) = match order {
        Order::Verbatim | Order::Ipv4First => (v4, v6),
        Order::Ipv6First => (v6, v4),
    };
    first
        .into_iter()
        .chain(second)
        .map(LookupAddr::from_ip)
        .collect()
}

fn map_to_v6(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V4(v4) => IpAddr::V6(v4.to_ipv6_mapped()),
        v6 => v6,
    }
}

/// Builder for [`HostResolver`]; every collaborator has a default.
pub struct HostResolverBuilder {
    cache: Option<Arc<dyn CacheStore>>,
    resolver: Option<Arc<dyn Resolver>>,
    hosts: Option<Arc<dyn HostsSource>>,
    ip_check: Option<Arc<dyn IpCheck>>,
    choice: Option<Arc<dyn ChoiceStrategy>>,
    failover: Option<Arc<dyn FailoverStrategy>>,
    throttle: Option<Arc<dyn Throttle>>,
    storage: Option<Arc<dyn PersistentStore>>,
    probe: Option<InterfaceProbe>,
}

impl HostResolverBuilder {
    pub fn new() -> Self {
        Self {
            cache: None,
            resolver: None,
            hosts: None,
            ip_check: None,
            choice: None,
            failover: None,
            throttle: None,
            storage: None,
            probe: None,
        }
    }

    pub fn cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn hosts(mut self, hosts: Arc<dyn HostsSource>) -> Self {
        self.hosts = Some(hosts);
        self
    }

    pub fn ip_check(mut self, ip_check: Arc<dyn IpCheck>) -> Self {
        self.ip_check = Some(ip_check);
        self
    }

    pub fn choice(mut self, choice: Arc<dyn ChoiceStrategy>) -> Self {
        self.choice = Some(choice);
        self
    }

    pub fn failover(mut self, failover: Arc<dyn FailoverStrategy>) -> Self {
        self.failover = Some(failover);
        self
    }

    /// Rate limit outbound resolver calls; absent means unthrottled.
    pub fn throttle(mut self, throttle: Arc<dyn Throttle>) -> Self {
        self.throttle = Some(throttle);
        self
    }

    /// Persist the cache across restarts; absent means no persistence.
    pub fn storage(mut self, storage: Arc<dyn PersistentStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Replace the `ADDRCONFIG` interface probe.
    pub fn interface_probe(mut self, probe: InterfaceProbe) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Build the engine. Fails with `UNSUPPORTED_PLATFORM` when no hosts
    /// source was supplied and the platform has no default hosts path.
    pub fn build(self) -> Result<HostResolver, DnsError> {
        let hosts: Arc<dyn HostsSource> = match self.hosts {
            Some(hosts) => hosts,
            None => Arc::new(HostsFile::system()?),
        };
        let memo_capacity = NonZeroUsize::new(IP_MEMO_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Ok(HostResolver {
            inner: Arc::new(Inner {
                cache: self.cache.unwrap_or_else(|| Arc::new(LruStore::new())),
                resolver: self
                    .resolver
                    .unwrap_or_else(|| Arc::new(HickoryResolver::new())),
                hosts,
                ip_check: self.ip_check.unwrap_or_else(|| Arc::new(StdIpCheck::new())),
                choice: self.choice.unwrap_or_else(|| Arc::new(RoundRobin::new())),
                failover: self
                    .failover
                    .unwrap_or_else(|| Arc::new(UniversalFailover::new())),
                throttle: self.throttle,
                storage: self.storage,
                probe: self.probe.unwrap_or_else(netcfg::default_probe),
                snapshot: RwLock::new(Arc::new(HostsSnapshot::default())),
                flights: Arc::new(FlightTable::new()),
                ip_memo: Mutex::new(LruCache::new(memo_capacity)),
                bootstrapped: AtomicBool::new(false),
            }),
        })
    }
}

impl Default for HostResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_orders() {
        let v4: Vec<IpAddr> = vec!["1.0.0.1".parse().unwrap()];
        let v6: Vec<IpAddr> = vec!["::1".parse().unwrap()];

        let verbatim = shape(v4.clone(), v6.clone(), Order::Verbatim);
        assert_eq!(verbatim[0].family, 4);
        assert_eq!(verbatim[1].family, 6);

        let v6_first = shape(v4, v6, Order::Ipv6First);
        assert_eq!(v6_first[0].family, 6);
        assert_eq!(v6_first[1].family, 4);
    }

    #[test]
    fn test_map_to_v6() {
        let mapped = map_to_v6("1.2.3.4".parse().unwrap());
        assert_eq!(mapped, "::ffff:1.2.3.4".parse::<IpAddr>().unwrap());
        let already_v6 = map_to_v6("::1".parse().unwrap());
        assert_eq!(already_v6, "::1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_answer_helpers() {
        let addr = LookupAddr::from_ip("1.2.3.4".parse().unwrap());
        assert_eq!(LookupAnswer::One(addr).single(), Some(addr));
        assert_eq!(LookupAnswer::Many(vec![addr]).single(), None);
        assert_eq!(LookupAnswer::One(addr).into_vec(), vec![addr]);
    }
}
