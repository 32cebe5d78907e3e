//! Persisted configuration
//!
//! The whole rule set and the global options live in one key-value record
//! owned by the host store (`chrome.storage.local` in the extension,
//! a JSON file for the CLI). Writes always replace the whole value; every
//! scan loads a fresh snapshot rather than holding a long-lived copy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{CardTypes, DomainRule};

/// Storage key of the current config record.
pub const CONFIG_KEY: &str = "config";
/// Storage key older builds used for the plain hidden-domain list.
pub const LEGACY_HIDDEN_KEY: &str = "hiddenDomains";
/// Storage key older builds used for the pinned-domain list.
pub const LEGACY_PINNED_KEY: &str = "pinnedDomains";
/// Storage key older builds used for the hidden-card bitmask.
pub const LEGACY_CARDS_KEY: &str = "hiddenCards";

// =============================================================================
// Record
// =============================================================================

/// The persisted config record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct Config {
    #[serde(default)]
    pub domains: Vec<DomainRule>,
    #[serde(default)]
    pub opts: Opts,
    /// Card kinds currently hidden. Absent in records written before cards
    /// moved into the config record.
    #[serde(default, rename = "hiddenCards", skip_serializing_if = "CardTypes::is_empty")]
    #[cfg_attr(feature = "ts", ts(type = "Array<string>"))]
    pub hidden_cards: CardTypes,
}

/// Global extension options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct Opts {
    pub debug: bool,
    pub streamlining: Streamlining,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            debug: true,
            streamlining: Streamlining::default(),
        }
    }
}

/// Per-module streamlining switches. Carried for record compatibility;
/// only the card-shaped modules influence the scan today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct Streamlining {
    pub shopping: bool,
    pub graph: bool,
    pub snippets: bool,
    pub questions: bool,
    pub related: bool,
    pub images: bool,
    pub videos: bool,
    pub definitions: bool,
}

impl Default for Streamlining {
    fn default() -> Self {
        Self {
            shopping: true,
            graph: true,
            snippets: true,
            questions: true,
            related: true,
            images: true,
            videos: true,
            definitions: true,
        }
    }
}

// =============================================================================
// Mutation ops
// =============================================================================

impl Config {
    /// Find the rule for a literal domain string, first entry wins.
    pub fn rule_for(&self, domain: &str) -> Option<&DomainRule> {
        self.domains.iter().find(|rule| rule.domain == domain)
    }

    /// Add a plain hide rule. Returns false (and changes nothing) when any
    /// rule for the domain already exists.
    pub fn hide_domain(&mut self, domain: &str) -> bool {
        if self.rule_for(domain).is_some() {
            log::warn!("domain {domain} already configured");
            return false;
        }
        self.domains.push(DomainRule::hidden(domain));
        true
    }

    /// Drop every rule for the domain.
    pub fn unhide_domain(&mut self, domain: &str) -> bool {
        let before = self.domains.len();
        self.domains.retain(|rule| rule.domain != domain);
        self.domains.len() < before
    }

    /// Pin a domain: upserts the pinned flag on an existing rule, or adds a
    /// pin rule. Returns false when the domain was already pinned.
    pub fn pin_domain(&mut self, domain: &str) -> bool {
        if let Some(rule) = self.domains.iter_mut().find(|rule| rule.domain == domain) {
            if rule.opts.pinned {
                log::warn!("domain {domain} already pinned");
                return false;
            }
            rule.opts.pinned = true;
            return true;
        }
        self.domains.push(DomainRule::pinned(domain));
        true
    }

    /// Drop pinned rules for the domain; unpinning never removes a plain
    /// hide rule.
    pub fn unpin_domain(&mut self, domain: &str) -> bool {
        let before = self.domains.len();
        self.domains
            .retain(|rule| rule.domain != domain || !rule.opts.pinned);
        self.domains.len() < before
    }

    /// Drop duplicate rules for the same literal domain, keeping the first
    /// one parsed.
    pub fn dedupe_domains(&mut self) -> usize {
        let mut seen = std::collections::HashSet::new();
        let before = self.domains.len();
        self.domains.retain(|rule| seen.insert(rule.domain.clone()));
        before - self.domains.len()
    }
}

// =============================================================================
// Legacy migration
// =============================================================================

/// Fold the pre-config storage keys into a config record.
///
/// Hidden domains become plain rules and pinned domains pin rules; when a
/// domain appears in both lists the first one parsed wins, so a previously
/// hidden domain stays hidden. The card bitmask carries over bit-for-bit.
pub fn migrate_legacy(hidden: &[String], pinned: &[String], cards_mask: u32) -> Config {
    let mut config = Config::default();

    for domain in hidden {
        config.hide_domain(domain);
    }
    for domain in pinned {
        if config.rule_for(domain).is_none() {
            config.domains.push(DomainRule::pinned(domain));
        }
    }
    config.hidden_cards = CardTypes::from_bits_truncate(cards_mask);

    config
}

// =============================================================================
// Store adapter
// =============================================================================

/// Error from the host key-value store. Never fatal: callers log it and
/// leave the UI in its last-known state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("malformed config record: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Host key-value store for the config record, whole-value-replace
/// semantics. Injected so the engine stays independent of the host
/// environment.
pub trait ConfigStore {
    /// Load the current record; `Ok(None)` when no record exists yet.
    fn load(&self) -> Result<Option<Config>, StoreError>;
    /// Replace the record.
    fn store(&self, config: &Config) -> Result<(), StoreError>;
}

/// Load the record, falling back to the default generator when absent.
pub fn load_or_default(store: &dyn ConfigStore) -> Result<Config, StoreError> {
    Ok(store.load()?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_generator_shape() {
        let config = Config::default();
        assert!(config.domains.is_empty());
        assert!(config.opts.debug);
        assert!(config.opts.streamlining.shopping);
        assert!(config.opts.streamlining.definitions);
        assert!(config.hidden_cards.is_empty());
    }

    #[test]
    fn test_record_roundtrip() {
        let mut config = Config::default();
        config.hide_domain("example.com");
        config.pin_domain("docs.rs");
        config.hidden_cards = CardTypes::DEFINITIONS;

        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_record_without_cards_or_opts_parses() {
        let parsed: Config =
            serde_json::from_str(r#"{"domains":[{"domain":"example.com"}]}"#).unwrap();
        assert_eq!(parsed.domains.len(), 1);
        assert_eq!(parsed.opts, Opts::default());
        assert!(parsed.hidden_cards.is_empty());
    }

    #[test]
    fn test_hide_domain_rejects_duplicates() {
        let mut config = Config::default();
        assert!(config.hide_domain("example.com"));
        assert!(!config.hide_domain("example.com"));
        assert_eq!(config.domains.len(), 1);
    }

    #[test]
    fn test_pin_domain_upserts_existing_rule() {
        let mut config = Config::default();
        config.hide_domain("example.com");
        assert!(config.pin_domain("example.com"));
        assert_eq!(config.domains.len(), 1);
        assert!(config.domains[0].opts.pinned);
        assert!(!config.pin_domain("example.com"));
    }

    #[test]
    fn test_unhide_removes_all_rules_for_domain() {
        let mut config = Config::default();
        config.hide_domain("example.com");
        config.hide_domain("other.com");
        assert!(config.unhide_domain("example.com"));
        assert!(!config.unhide_domain("example.com"));
        assert_eq!(config.domains.len(), 1);
    }

    #[test]
    fn test_unpin_keeps_plain_hide_rules() {
        let mut config = Config::default();
        config.hide_domain("example.com");
        config.domains.push(DomainRule::pinned("pinned.com"));

        assert!(config.unpin_domain("pinned.com"));
        assert!(!config.unpin_domain("example.com"));
        assert_eq!(config.domains.len(), 1);
        assert_eq!(config.domains[0].domain, "example.com");
    }

    #[test]
    fn test_dedupe_keeps_first_parsed() {
        let mut config = Config::default();
        config.domains.push(DomainRule::hidden("example.com"));
        config.domains.push(DomainRule::pinned("example.com"));
        config.domains.push(DomainRule::hidden("other.com"));

        assert_eq!(config.dedupe_domains(), 1);
        assert_eq!(config.domains.len(), 2);
        assert!(!config.domains[0].opts.pinned);
    }

    #[test]
    fn test_migrate_legacy_first_wins() {
        let hidden = vec!["example.com".to_string(), "dup.com".to_string()];
        let pinned = vec!["dup.com".to_string(), "docs.rs".to_string()];

        let config = migrate_legacy(&hidden, &pinned, 0b101);

        assert_eq!(config.domains.len(), 3);
        // dup.com stays a hide rule: the hidden list was parsed first
        let dup = config.rule_for("dup.com").unwrap();
        assert!(!dup.opts.pinned);
        let docs = config.rule_for("docs.rs").unwrap();
        assert!(docs.opts.pinned);
        assert_eq!(
            config.hidden_cards,
            CardTypes::DEFINITIONS | CardTypes::RELATED_RESULTS
        );
    }

    struct EmptyStore;

    impl ConfigStore for EmptyStore {
        fn load(&self) -> Result<Option<Config>, StoreError> {
            Ok(None)
        }
        fn store(&self, _config: &Config) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn test_load_or_default_generates_record() {
        let config = load_or_default(&EmptyStore).unwrap();
        assert_eq!(config, Config::default());
    }
}
