//! Base types and error handling.
//!
//! Provides the foundational [`DnsError`](error::DnsError) taxonomy shared
//! by every component of the lookup engine.

pub mod error;
