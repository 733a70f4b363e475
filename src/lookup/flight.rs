//! Single-flight coalescing of concurrent resolutions.
//!
//! At most one network query per `(hostname, family)` is outstanding;
//! callers arriving while one is in flight await the same shared outcome.
//! The work runs in a spawned task, so a caller dropping its future never
//! cancels the query for the others.

use crate::base::error::DnsError;
use crate::lookup::entry::{CacheEntry, CacheKey};
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::future::Future;
use std::sync::Arc;

/// Outcome shared between coalesced callers.
pub(crate) type FlightOutcome = Result<Arc<CacheEntry>, DnsError>;

type SharedFlight = Shared<BoxFuture<'static, FlightOutcome>>;

/// The in-flight table. Map operations are the only critical sections;
/// nothing awaits while holding a shard lock.
#[derive(Default)]
pub(crate) struct FlightTable {
    flights: DashMap<CacheKey, SharedFlight>,
}

impl FlightTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the flight for `key`, starting one with `work` if none exists.
    ///
    /// `work` runs in a spawned task and must remove the slot (via
    /// [`FlightGuard`]) after it has updated the cache.
    pub fn join<F>(&self, key: &CacheKey, work: F) -> impl Future<Output = FlightOutcome>
    where
        F: FnOnce() -> BoxFuture<'static, FlightOutcome>,
    {
        self.flights
            .entry(key.clone())
            .or_insert_with(|| {
                let handle = tokio::spawn(work());
                async move {
                    match handle.await {
                        Ok(outcome) => outcome,
                        Err(_) => Err(DnsError::Cancelled),
                    }
                }
                .boxed()
                .shared()
            })
            .clone()
    }

    fn remove(&self, key: &CacheKey) {
        self.flights.remove(key);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.flights.len()
    }
}

/// Removes the in-flight slot when dropped.
///
/// Held by the spawned resolution task for its whole body, so the slot is
/// released after the cache write on every path, panics included.
pub(crate) struct FlightGuard {
    table: Arc<FlightTable>,
    key: CacheKey,
}

impl FlightGuard {
    pub fn new(table: Arc<FlightTable>, key: CacheKey) -> Self {
        Self { table, key }
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.table.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::entry::RecordFamily;
    use crate::resolver::ResolvedAddress;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{Duration, Instant};

    fn success_entry() -> Arc<CacheEntry> {
        Arc::new(CacheEntry::success(
            vec![ResolvedAddress::new("1.2.3.4".parse().unwrap(), 60)],
            Instant::now(),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_joiners_share_one_flight() {
        let table = Arc::new(FlightTable::new());
        let key = CacheKey::new("ex.com", RecordFamily::V4);
        let started = Arc::new(AtomicUsize::new(0));

        let mut joined = Vec::new();
        for _ in 0..10 {
            let started = started.clone();
            let guard_table = table.clone();
            let guard_key = key.clone();
            joined.push(table.join(&key, move || {
                let guard = FlightGuard::new(guard_table, guard_key);
                async move {
                    let _guard = guard;
                    started.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    Ok(success_entry())
                }
                .boxed()
            }));
        }

        let outcomes = futures::future::join_all(joined).await;
        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert!(outcomes.iter().all(|o| o.is_ok()));
        assert_eq!(table.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slot_released_after_error() {
        let table = Arc::new(FlightTable::new());
        let key = CacheKey::new("down.test", RecordFamily::V6);

        let guard_table = table.clone();
        let guard_key = key.clone();
        let outcome = table
            .join(&key, move || {
                let guard = FlightGuard::new(guard_table, guard_key);
                async move {
                    let _guard = guard;
                    Err(DnsError::Timeout)
                }
                .boxed()
            })
            .await;

        assert!(matches!(outcome, Err(DnsError::Timeout)));
        assert_eq!(table.len(), 0);
    }
}
