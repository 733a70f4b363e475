//! Address selection for single-result lookups.
//!
//! When a caller asks for one address out of a candidate list, a
//! [`ChoiceStrategy`] picks it. Rotation state is keyed by the identity of
//! whatever produced the list (a cache entry or hosts record owns the
//! counter), so the round-robin property holds across calls without
//! weak-keyed maps.

use crate::base::error::DnsError;
use crate::lookup::LookupAddr;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Trait for choosing one element from a candidate list.
pub trait ChoiceStrategy: Send + Sync {
    /// Choose one candidate; fails with `EMPTY_ARRAY` on empty input.
    ///
    /// `rotation` is the counter owned by the list's producer; strategies
    /// that do not rotate may ignore it.
    fn choose_one(
        &self,
        candidates: &[LookupAddr],
        rotation: &AtomicUsize,
    ) -> Result<LookupAddr, DnsError>;
}

/// Round-robin selection: element 0, 1, 2, ... then wrapping.
///
/// The increment is a single atomic fetch-add, so concurrent calls each
/// advance the rotation exactly once.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobin;

impl RoundRobin {
    pub fn new() -> Self {
        Self
    }
}

impl ChoiceStrategy for RoundRobin {
    fn choose_one(
        &self,
        candidates: &[LookupAddr],
        rotation: &AtomicUsize,
    ) -> Result<LookupAddr, DnsError> {
        if candidates.is_empty() {
            return Err(DnsError::EmptyArray);
        }
        let index = rotation.fetch_add(1, Ordering::Relaxed) % candidates.len();
        Ok(candidates[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;

    fn candidates(ips: &[&str]) -> Vec<LookupAddr> {
        ips.iter()
            .map(|s| LookupAddr::from_ip(s.parse::<IpAddr>().unwrap()))
            .collect()
    }

    #[test]
    fn test_empty_input_fails() {
        let rotation = AtomicUsize::new(0);
        assert_eq!(
            RoundRobin::new().choose_one(&[], &rotation),
            Err(DnsError::EmptyArray)
        );
    }

    #[test]
    fn test_rotation_wraps() {
        let list = candidates(&["1.0.0.1", "1.0.0.2", "1.0.0.3"]);
        let rotation = AtomicUsize::new(0);
        let strategy = RoundRobin::new();

        let picks: Vec<_> = (0..4)
            .map(|_| strategy.choose_one(&list, &rotation).unwrap().address)
            .collect();
        assert_eq!(
            picks,
            vec![
                "1.0.0.1".parse::<IpAddr>().unwrap(),
                "1.0.0.2".parse().unwrap(),
                "1.0.0.3".parse().unwrap(),
                "1.0.0.1".parse().unwrap(),
            ]
        );
    }

    #[test]
    fn test_single_candidate() {
        let list = candidates(&["::1"]);
        let rotation = AtomicUsize::new(0);
        for _ in 0..3 {
            let pick = RoundRobin::new().choose_one(&list, &rotation).unwrap();
            assert_eq!(pick.family, 6);
        }
    }
}
