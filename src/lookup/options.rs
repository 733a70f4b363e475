//! Lookup option surface.
//!
//! Mirrors the conventional host-resolution call: single vs all results,
//! address-family filter, resolution hints, and response ordering, plus
//! the legacy `verbatim` flag.

use crate::base::error::DnsError;
use std::str::FromStr;

/// Resolution hints, combined by bit-OR into [`LookupOptions::hints`].
pub mod hints {
    /// Restrict queried families to those available on local interfaces.
    pub const ADDRCONFIG: u32 = 1 << 0;
    /// With `family = V6`: map IPv4 results into IPv6 space when no AAAA
    /// records exist.
    pub const V4MAPPED: u32 = 1 << 1;
    /// With `V4MAPPED`: return both AAAA and mapped A results.
    pub const ALL: u32 = 1 << 2;

    pub(crate) const KNOWN: u32 = ADDRCONFIG | V4MAPPED | ALL;
}

/// Address-family filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Family {
    /// No filter; both A and AAAA are queried.
    #[default]
    Any,
    V4,
    V6,
}

impl Family {
    /// Numeric form: 0, 4, or 6. Anything else is `BADFAMILY`.
    pub fn from_number(n: u8) -> Result<Self, DnsError> {
        match n {
            0 => Ok(Family::Any),
            4 => Ok(Family::V4),
            6 => Ok(Family::V6),
            _ => Err(DnsError::BadFamily),
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Family::Any => 0,
            Family::V4 => 4,
            Family::V6 => 6,
        }
    }
}

impl FromStr for Family {
    type Err = DnsError;

    /// Accepts the numeric forms and the `"IPv4"`/`"IPv6"` aliases,
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, DnsError> {
        match s.to_ascii_lowercase().as_str() {
            "0" => Ok(Family::Any),
            "4" | "ipv4" => Ok(Family::V4),
            "6" | "ipv6" => Ok(Family::V6),
            _ => Err(DnsError::BadFamily),
        }
    }
}

/// Ordering of the shaped candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Families in fetch order: A results, then AAAA results.
    #[default]
    Verbatim,
    /// All IPv4 results before IPv6.
    Ipv4First,
    /// All IPv6 results before IPv4.
    Ipv6First,
}

/// Options for one lookup call.
#[derive(Debug, Clone, Default)]
pub struct LookupOptions {
    /// Return every candidate instead of one.
    pub all: bool,
    /// Address-family filter.
    pub family: Family,
    /// Bit-OR of the [`hints`] constants.
    pub hints: u32,
    /// Response ordering; defaults to [`Order::Verbatim`] when absent.
    pub order: Option<Order>,
    /// Deprecated: `Some(false)` maps to [`Order::Ipv4First`] when `order`
    /// is absent.
    pub verbatim: Option<bool>,
}

impl LookupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(mut self, all: bool) -> Self {
        self.all = all;
        self
    }

    pub fn family(mut self, family: Family) -> Self {
        self.family = family;
        self
    }

    pub fn hints(mut self, hints: u32) -> Self {
        self.hints = hints;
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn verbatim(mut self, verbatim: bool) -> Self {
        self.verbatim = Some(verbatim);
        self
    }

    /// Apply defaults and validate, producing the normalized per-call view.
    pub(crate) fn normalize(&self) -> Result<Resolved, DnsError> {
        if self.hints & !hints::KNOWN != 0 {
            return Err(DnsError::BadHints);
        }
        let order = self.order.unwrap_or(match self.verbatim {
            Some(false) => Order::Ipv4First,
            _ => Order::Verbatim,
        });
        Ok(Resolved {
            all: self.all,
            family: self.family,
            hints: self.hints,
            order,
        })
    }
}

/// Normalized options, after defaulting and legacy-flag translation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Resolved {
    pub all: bool,
    pub family: Family,
    pub hints: u32,
    pub order: Order,
}

impl Resolved {
    pub fn has_hint(&self, bit: u32) -> bool {
        self.hints & bit != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_aliases() {
        assert_eq!("IPv4".parse::<Family>().unwrap(), Family::V4);
        assert_eq!("ipv6".parse::<Family>().unwrap(), Family::V6);
        assert_eq!("0".parse::<Family>().unwrap(), Family::Any);
        assert_eq!("5".parse::<Family>(), Err(DnsError::BadFamily));
        assert_eq!(Family::from_number(4).unwrap(), Family::V4);
        assert_eq!(Family::from_number(3), Err(DnsError::BadFamily));
    }

    #[test]
    fn test_defaults() {
        let resolved = LookupOptions::new().normalize().unwrap();
        assert!(!resolved.all);
        assert_eq!(resolved.family, Family::Any);
        assert_eq!(resolved.hints, 0);
        assert_eq!(resolved.order, Order::Verbatim);
    }

    #[test]
    fn test_legacy_verbatim_false_maps_to_ipv4_first() {
        let resolved = LookupOptions::new().verbatim(false).normalize().unwrap();
        assert_eq!(resolved.order, Order::Ipv4First);
    }

    #[test]
    fn test_explicit_order_wins_over_verbatim() {
        let resolved = LookupOptions::new()
            .verbatim(false)
            .order(Order::Ipv6First)
            .normalize()
            .unwrap();
        assert_eq!(resolved.order, Order::Ipv6First);
    }

    #[test]
    fn test_verbatim_true_keeps_verbatim_order() {
        let resolved = LookupOptions::new().verbatim(true).normalize().unwrap();
        assert_eq!(resolved.order, Order::Verbatim);
    }

    #[test]
    fn test_unknown_hint_bits_rejected() {
        let result = LookupOptions::new().hints(1 << 7).normalize();
        assert_eq!(result.err(), Some(DnsError::BadHints));
    }
}
