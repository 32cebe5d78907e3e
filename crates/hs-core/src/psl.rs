//! Public Suffix List utilities for registrable-domain extraction
//!
//! Lookups go through the compiled-in list from the `psl` crate, so
//! multi-part suffixes (`co.uk`, `com.au`, ...) resolve correctly without
//! any runtime list loading.
//!
//! # Examples
//!
//! ```
//! use hs_core::psl::registrable_domain;
//!
//! assert_eq!(registrable_domain("sub.example.com").as_deref(), Some("example.com"));
//! assert_eq!(registrable_domain("sub.example.co.uk").as_deref(), Some("example.co.uk"));
//! ```

use thiserror::Error;

/// Error for user-entered domain input that fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("domain is empty")]
    Empty,
    #[error("'{0}' is not a registrable domain")]
    NotRegistrable(String),
}

/// Get the registrable domain (public-suffix + 1 label) for a hostname.
///
/// Returns `None` for hostnames the list cannot anchor (empty input, bare
/// suffixes, IP-ish labels); callers treat that as "no match", never an
/// error.
pub fn registrable_domain(host: &str) -> Option<String> {
    let host = normalize_host(host);
    if host.is_empty() {
        return None;
    }
    psl::domain_str(&host).map(str::to_owned)
}

/// Check whether two hostnames share a registrable domain.
pub fn same_registrable_domain(a: &str, b: &str) -> bool {
    match (registrable_domain(a), registrable_domain(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Validate a user-entered domain and return its normalized form.
///
/// The input must itself anchor to a registrable domain; subdomains of one
/// (`news.example.co.uk`) are accepted so strict rules can target them.
pub fn validate_domain_input(input: &str) -> Result<String, DomainError> {
    let host = normalize_host(input);
    if host.is_empty() {
        return Err(DomainError::Empty);
    }
    match psl::domain_str(&host) {
        Some(_) => Ok(host),
        None => Err(DomainError::NotRegistrable(input.trim().to_owned())),
    }
}

fn normalize_host(host: &str) -> String {
    host.trim().trim_end_matches('.').to_lowercase()
}

/// Get the parent domain (strip leftmost label).
pub fn parent_domain(host: &str) -> Option<&str> {
    match host.find('.') {
        Some(idx) if idx < host.len() - 1 => Some(&host[idx + 1..]),
        _ => None,
    }
}

/// Iterator over a host's label-boundary suffixes, from the full host down
/// to its registrable domain.
pub struct HostSuffixIter<'a> {
    current: &'a str,
    registrable_len: usize,
}

impl<'a> Iterator for HostSuffixIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.len() < self.registrable_len || self.current.is_empty() {
            return None;
        }

        let result = self.current;

        self.current = match parent_domain(self.current) {
            Some(parent) if parent.len() >= self.registrable_len => parent,
            _ => "",
        };

        Some(result)
    }
}

/// Walk host suffixes from most specific to least specific, stopping at the
/// registrable domain. Hosts the list cannot anchor yield nothing.
///
/// `walk_host_suffixes("tracker.ads.example.com")` yields
/// `tracker.ads.example.com`, `ads.example.com`, `example.com`.
pub fn walk_host_suffixes(host: &str) -> HostSuffixIter<'_> {
    let registrable_len = psl::domain_str(host).map(str::len).unwrap_or(usize::MAX);
    HostSuffixIter {
        current: host,
        registrable_len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registrable_domain_simple() {
        assert_eq!(registrable_domain("example.com").as_deref(), Some("example.com"));
        assert_eq!(registrable_domain("sub.example.com").as_deref(), Some("example.com"));
        assert_eq!(registrable_domain("a.b.example.com").as_deref(), Some("example.com"));
    }

    #[test]
    fn test_registrable_domain_multi_part_suffix() {
        assert_eq!(
            registrable_domain("news.example.co.uk").as_deref(),
            Some("example.co.uk")
        );
        assert_eq!(
            registrable_domain("example.co.uk").as_deref(),
            Some("example.co.uk")
        );
    }

    #[test]
    fn test_registrable_domain_normalizes() {
        assert_eq!(
            registrable_domain("  Sub.Example.COM.  ").as_deref(),
            Some("example.com")
        );
    }

    #[test]
    fn test_registrable_domain_rejects_malformed() {
        assert_eq!(registrable_domain(""), None);
        assert_eq!(registrable_domain("   "), None);
        assert_eq!(registrable_domain("com"), None);
    }

    #[test]
    fn test_same_registrable_domain() {
        assert!(same_registrable_domain("a.example.com", "b.example.com"));
        assert!(!same_registrable_domain("example.com", "example.org"));
        assert!(!same_registrable_domain("", "example.com"));
    }

    #[test]
    fn test_parent_domain() {
        assert_eq!(parent_domain("sub.example.com"), Some("example.com"));
        assert_eq!(parent_domain("example.com"), Some("com"));
        assert_eq!(parent_domain("com"), None);
        assert_eq!(parent_domain(""), None);
    }

    #[test]
    fn test_walk_host_suffixes() {
        let suffixes: Vec<&str> = walk_host_suffixes("tracker.ads.example.com").collect();
        assert_eq!(
            suffixes,
            vec!["tracker.ads.example.com", "ads.example.com", "example.com"]
        );
    }

    #[test]
    fn test_walk_host_suffixes_stops_at_registrable() {
        let suffixes: Vec<&str> = walk_host_suffixes("a.example.co.uk").collect();
        assert_eq!(suffixes, vec!["a.example.co.uk", "example.co.uk"]);
    }

    #[test]
    fn test_walk_host_suffixes_unanchored_host_is_empty() {
        assert_eq!(walk_host_suffixes("com").count(), 0);
        assert_eq!(walk_host_suffixes("").count(), 0);
    }

    #[test]
    fn test_validate_domain_input() {
        assert_eq!(
            validate_domain_input("Example.com").as_deref(),
            Ok("example.com")
        );
        assert_eq!(
            validate_domain_input("news.example.co.uk").as_deref(),
            Ok("news.example.co.uk")
        );
        assert_eq!(validate_domain_input(""), Err(DomainError::Empty));
        assert_eq!(
            validate_domain_input("co.uk"),
            Err(DomainError::NotRegistrable("co.uk".into()))
        );
    }
}
