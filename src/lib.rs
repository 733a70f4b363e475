//! # hostcache
//!
//! A caching DNS lookup engine whose external contract mirrors a
//! conventional host-resolution call: hostname and options in, one or all
//! IP addresses out. Resolution is network-only (A/AAAA queries, never the
//! OS's blocking address-info call), with the interesting behavior layered
//! on top:
//!
//! - **TTL-aware caching** of successes and failures, with stale data
//!   served under a configurable failover policy when re-resolution fails
//! - **Single-flight coalescing**: one outstanding query per
//!   `(hostname, family)` no matter how many callers race
//! - **Hosts-file overlay**, watched for changes and locally authoritative
//! - **IP-literal short-circuiting** with `V4MAPPED` translation
//! - **Round-robin rotation** across cached addresses per call
//! - Optional **throttling** of outbound queries and **persistence** of
//!   the cache across restarts
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hostcache::lookup::{HostResolver, LookupOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), hostcache::base::error::DnsError> {
//!     let resolver = HostResolver::new()?;
//!     resolver.bootstrap().await?;
//!
//!     let answer = resolver.lookup("example.com", LookupOptions::new()).await?;
//!     println!("resolved: {:?}", answer);
//!
//!     resolver.teardown().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error taxonomy shared by every component
//! - [`ip`] - IP-literal recognition
//! - [`resolver`] - Network A/AAAA resolution (hickory-dns backed)
//! - [`hosts`] - Hosts-file reading, parsing, and watching
//! - [`cache`] - Bounded LRU store for resolution outcomes
//! - [`persist`] - Optional cache persistence across restarts
//! - [`select`] - Selection strategies for single-result lookups
//! - [`failover`] - Failure caching and stale-fallback policy
//! - [`throttle`] - Rate limiting of outbound queries
//! - [`lookup`] - The controller composing all of the above

pub mod base;
pub mod cache;
pub mod failover;
pub mod hosts;
pub mod ip;
pub mod lookup;
pub mod persist;
pub mod resolver;
pub mod select;
pub mod throttle;
