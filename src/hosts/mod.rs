//! Hosts-file reading and watching.
//!
//! The hosts file is a locally authoritative hostname-to-address table; the
//! lookup controller overlays it on top of DNS. This module provides the
//! [`HostsSource`] trait and the default file-backed implementation with a
//! debounced change watcher.

use crate::base::error::DnsError;
use notify_debouncer_mini::{
    new_debouncer,
    notify::{self, RecursiveMode, Watcher as _},
    DebounceEventResult, Debouncer,
};
use parking_lot::Mutex;
use std::io;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Handler invoked after every (debounced) hosts-file modification.
pub type HostsChangeHandler = Arc<dyn Fn() + Send + Sync>;

/// Trait for hosts-file access.
///
/// `watch` must be idempotent: a second call while a watcher is active is a
/// no-op. `read` returns one `(hostname, address)` pair per mapping, in file
/// order, with hostnames lowercased.
pub trait HostsSource: Send + Sync {
    /// Read and parse the hosts file.
    fn read(&self) -> Result<Vec<(String, IpAddr)>, DnsError>;

    /// Start watching for modifications, invoking `on_change` after each.
    fn watch(&self, on_change: HostsChangeHandler) -> Result<(), DnsError>;

    /// Stop watching. Safe to call without a prior `watch`.
    fn stop_watching(&self);
}

/// Debounce window for file-change events.
const WATCH_DEBOUNCE: Duration = Duration::from_millis(100);

/// File-backed hosts source using a debounced filesystem watcher.
pub struct HostsFile {
    path: PathBuf,
    watcher: Mutex<Option<Debouncer<notify::RecommendedWatcher>>>,
}

impl HostsFile {
    /// Hosts source over an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            watcher: Mutex::new(None),
        }
    }

    /// Hosts source over the platform's default hosts path.
    ///
    /// `/etc/hosts` on Unix, the canonical system hosts path on Windows;
    /// fails with `UNSUPPORTED_PLATFORM` elsewhere.
    pub fn system() -> Result<Self, DnsError> {
        Ok(Self::new(default_hosts_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HostsSource for HostsFile {
    fn read(&self) -> Result<Vec<(String, IpAddr)>, DnsError> {
        let bytes = std::fs::read(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => DnsError::HostsNotFound,
            _ => DnsError::HostsNotReadable,
        })?;
        let text = std::str::from_utf8(&bytes).map_err(|_| DnsError::HostsParseError)?;
        parse_hosts(text)
    }

    fn watch(&self, on_change: HostsChangeHandler) -> Result<(), DnsError> {
        let mut guard = self.watcher.lock();
        if guard.is_some() {
            return Ok(());
        }

        let mut debouncer = new_debouncer(WATCH_DEBOUNCE, move |res: DebounceEventResult| {
            match res {
                Ok(events) if !events.is_empty() => on_change(),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "hosts watcher error"),
            }
        })
        .map_err(|_| DnsError::HostsNotReadable)?;

        debouncer
            .watcher()
            .watch(&self.path, RecursiveMode::NonRecursive)
            .map_err(|e| match e.kind {
                notify::ErrorKind::PathNotFound => DnsError::HostsNotFound,
                _ => DnsError::HostsNotReadable,
            })?;

        *guard = Some(debouncer);
        Ok(())
    }

    fn stop_watching(&self) {
        self.watcher.lock().take();
    }
}

/// Platform default hosts-file path.
#[cfg(unix)]
pub fn default_hosts_path() -> Result<PathBuf, DnsError> {
    Ok(PathBuf::from("/etc/hosts"))
}

#[cfg(windows)]
pub fn default_hosts_path() -> Result<PathBuf, DnsError> {
    Ok(PathBuf::from(r"C:\Windows\System32\drivers\etc\hosts"))
}

#[cfg(not(any(unix, windows)))]
pub fn default_hosts_path() -> Result<PathBuf, DnsError> {
    Err(DnsError::UnsupportedPlatform)
}

/// Parse hosts-file text into `(hostname, address)` pairs.
///
/// Blank lines and `#` comments are skipped; each remaining line is
/// `address hostname [hostname...]`. A line whose address token does not
/// parse is a parse error. Hostnames are lowercased.
pub fn parse_hosts(text: &str) -> Result<Vec<(String, IpAddr)>, DnsError> {
    let mut pairs = Vec::new();
    for line in text.lines() {
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        };
        let mut tokens = line.split_whitespace();
        let Some(addr_token) = tokens.next() else {
            continue;
        };
        let addr: IpAddr = addr_token.parse().map_err(|_| DnsError::HostsParseError)?;
        for host in tokens {
            pairs.push((host.to_ascii_lowercase(), addr));
        }
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_parse_basic() {
        let text = "127.0.0.1 localhost\n::1 localhost ip6-localhost\n";
        let pairs = parse_hosts(text).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("localhost".into(), IpAddr::V4(Ipv4Addr::LOCALHOST)),
                ("localhost".into(), IpAddr::V6(Ipv6Addr::LOCALHOST)),
                ("ip6-localhost".into(), IpAddr::V6(Ipv6Addr::LOCALHOST)),
            ]
        );
    }

    #[test]
    fn test_parse_comments_and_blanks() {
        let text = "# header\n\n10.0.0.1 router # gateway\n   \n";
        let pairs = parse_hosts(text).unwrap();
        assert_eq!(pairs, vec![("router".into(), "10.0.0.1".parse().unwrap())]);
    }

    #[test]
    fn test_parse_lowercases_hostnames() {
        let pairs = parse_hosts("10.0.0.2 Api.Local").unwrap();
        assert_eq!(pairs[0].0, "api.local");
    }

    #[test]
    fn test_parse_bad_address() {
        assert_eq!(
            parse_hosts("not-an-address somehost"),
            Err(DnsError::HostsParseError)
        );
    }

    #[test]
    fn test_read_missing_file() {
        let hosts = HostsFile::new("/definitely/not/a/real/hosts/path");
        assert_eq!(hosts.read(), Err(DnsError::HostsNotFound));
    }

    #[test]
    fn test_read_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(&path, "192.168.1.5 printer.lan printer\n").unwrap();

        let hosts = HostsFile::new(&path);
        let pairs = hosts.read().unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], ("printer.lan".into(), "192.168.1.5".parse().unwrap()));
    }

    #[test]
    fn test_watch_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(&path, "127.0.0.1 localhost\n").unwrap();

        let hosts = HostsFile::new(&path);
        let noop: HostsChangeHandler = Arc::new(|| {});
        hosts.watch(noop.clone()).unwrap();
        hosts.watch(noop).unwrap();
        hosts.stop_watching();
        hosts.stop_watching();
    }
}
