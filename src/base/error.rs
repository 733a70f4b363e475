use thiserror::Error;

/// Error kinds surfaced by the lookup engine.
///
/// The resolver-facing variants mirror the conventional textual codes a
/// system resolver reports (`NOTFOUND`, `SERVFAIL`, ...); the remaining
/// variants are owned by this crate (hosts file, storage, selection).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DnsError {
    // Resolver errors
    #[error("domain name not found")]
    NotFound,
    #[error("no records of the requested type")]
    NoData,
    #[error("server failed to complete the request")]
    ServFail,
    #[error("server refused the query")]
    Refused,
    #[error("connection to the server refused")]
    ConnRefused,
    #[error("query timed out")]
    Timeout,
    #[error("unsupported address family")]
    BadFamily,
    #[error("misformatted domain name")]
    BadName,
    #[error("misformatted query")]
    BadQuery,
    #[error("misformatted response")]
    BadResp,
    #[error("illegal flags specified")]
    BadFlags,
    #[error("illegal hints specified")]
    BadHints,
    #[error("query cancelled")]
    Cancelled,
    #[error("server reported a format error")]
    FormErr,
    #[error("out of memory")]
    NoMem,
    #[error("given hostname is not numeric")]
    NoName,
    #[error("query type not implemented by the server")]
    NotImp,
    #[error("resolver library not initialized")]
    NotInitialized,

    // Controller-owned errors
    #[error("cannot choose from an empty list")]
    EmptyArray,
    #[error("hosts file not found")]
    HostsNotFound,
    #[error("hosts file not readable")]
    HostsNotReadable,
    #[error("hosts file could not be parsed")]
    HostsParseError,
    #[error("no default hosts file path on this platform")]
    UnsupportedPlatform,
    #[error("persistent storage failure: {0}")]
    Storage(String),
}

impl DnsError {
    /// The conventional textual code for this error.
    ///
    /// Failover policies match on these strings, and the persisted cache
    /// blob stores them for failure entries.
    pub fn code(&self) -> &'static str {
        match self {
            DnsError::NotFound => "NOTFOUND",
            DnsError::NoData => "NODATA",
            DnsError::ServFail => "SERVFAIL",
            DnsError::Refused => "REFUSED",
            DnsError::ConnRefused => "CONNREFUSED",
            DnsError::Timeout => "TIMEOUT",
            DnsError::BadFamily => "BADFAMILY",
            DnsError::BadName => "BADNAME",
            DnsError::BadQuery => "BADQUERY",
            DnsError::BadResp => "BADRESP",
            DnsError::BadFlags => "BADFLAGS",
            DnsError::BadHints => "BADHINTS",
            DnsError::Cancelled => "CANCELLED",
            DnsError::FormErr => "FORMERR",
            DnsError::NoMem => "NOMEM",
            DnsError::NoName => "NONAME",
            DnsError::NotImp => "NOTIMP",
            DnsError::NotInitialized => "NOTINITIALIZED",
            DnsError::EmptyArray => "EMPTY_ARRAY",
            DnsError::HostsNotFound => "HOSTS_NOT_FOUND",
            DnsError::HostsNotReadable => "HOSTS_NOT_READABLE",
            DnsError::HostsParseError => "HOSTS_PARSE_ERROR",
            DnsError::UnsupportedPlatform => "UNSUPPORTED_PLATFORM",
            DnsError::Storage(_) => "STORAGE",
        }
    }

    /// Reverse lookup from a textual code.
    ///
    /// `STORAGE` is not reversible (it carries a message) and unknown codes
    /// return `None`; the persistence layer skips such records.
    pub fn from_code(code: &str) -> Option<DnsError> {
        Some(match code {
            "NOTFOUND" => DnsError::NotFound,
            "NODATA" => DnsError::NoData,
            "SERVFAIL" => DnsError::ServFail,
            "REFUSED" => DnsError::Refused,
            "CONNREFUSED" => DnsError::ConnRefused,
            "TIMEOUT" => DnsError::Timeout,
            "BADFAMILY" => DnsError::BadFamily,
            "BADNAME" => DnsError::BadName,
            "BADQUERY" => DnsError::BadQuery,
            "BADRESP" => DnsError::BadResp,
            "BADFLAGS" => DnsError::BadFlags,
            "BADHINTS" => DnsError::BadHints,
            "CANCELLED" => DnsError::Cancelled,
            "FORMERR" => DnsError::FormErr,
            "NOMEM" => DnsError::NoMem,
            "NONAME" => DnsError::NoName,
            "NOTIMP" => DnsError::NotImp,
            "NOTINITIALIZED" => DnsError::NotInitialized,
            "EMPTY_ARRAY" => DnsError::EmptyArray,
            "HOSTS_NOT_FOUND" => DnsError::HostsNotFound,
            "HOSTS_NOT_READABLE" => DnsError::HostsNotReadable,
            "HOSTS_PARSE_ERROR" => DnsError::HostsParseError,
            "UNSUPPORTED_PLATFORM" => DnsError::UnsupportedPlatform,
            _ => return None,
        })
    }
}
