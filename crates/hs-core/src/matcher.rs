//! Rule evaluation engine
//!
//! Every scan goes through here: partition the rule set into its three
//! buckets, match each result hostname against each rule, and fold the
//! matches into one action per element with override rules getting the
//! final say.

use crate::psl::{registrable_domain, walk_host_suffixes};
use crate::types::{Action, DomainRule, Resolution, ResultElement};

// =============================================================================
// Domain matching
// =============================================================================

/// Check whether a result hostname matches a configured rule.
///
/// Exact form compares the hostname literally. The lazy form (non-strict
/// rules) also accepts any label-boundary suffix of the hostname down to
/// its registrable domain, so both `sub.example.com` and
/// `tracker.ads.example.com` match a lazy `ads.example.com` rule via their
/// `example.com` / `ads.example.com` suffixes.
///
/// Hostnames that cannot be anchored to a registrable domain never match;
/// the rule is silently skipped for that element.
pub fn matches(result_hostname: &str, rule: &DomainRule) -> bool {
    if registrable_domain(result_hostname).is_none() {
        return false;
    }

    let hostname = result_hostname.trim().trim_end_matches('.').to_lowercase();
    if hostname == rule.domain {
        return true;
    }
    if rule.opts.strict {
        return false;
    }
    walk_host_suffixes(&hostname).any(|suffix| suffix == rule.domain)
}

// =============================================================================
// Partitioning
// =============================================================================

/// The rule set split into its three evaluation buckets. Within each bucket
/// the indices keep input order; no rule lands in more than one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// `!strict && !override`
    pub lazy: Vec<usize>,
    /// `strict && !override`
    pub exact: Vec<usize>,
    /// `override`, regardless of strict
    pub overrides: Vec<usize>,
}

/// Split rules into the `[lazy, exact, override]` buckets by index.
pub fn partition(rules: &[DomainRule]) -> Partition {
    let mut parts = Partition::default();

    for (index, rule) in rules.iter().enumerate() {
        if rule.opts.override_others {
            parts.overrides.push(index);
        } else if rule.opts.strict {
            parts.exact.push(index);
        } else {
            parts.lazy.push(index);
        }
    }

    parts
}

// =============================================================================
// Resolution
// =============================================================================

/// Candidate action a matching rule contributes.
fn candidate_action(rule: &DomainRule) -> Action {
    if rule.opts.override_others {
        if rule.opts.pinned {
            Action::Pin
        } else {
            Action::None
        }
    } else if rule.opts.pinned {
        Action::Pin
    } else {
        Action::Remove
    }
}

/// Resolve one action per element.
///
/// Buckets run in the fixed order `[lazy, exact, override]`; a match in a
/// later bucket overwrites the action from an earlier one, which is what
/// lets override rules cancel a removal. Within a single bucket the first
/// matching rule in list order wins. Elements nothing matches keep the
/// implicit `Action::None` (callers reset visual state before applying, so
/// a deleted rule's effect is not sticky).
///
/// The output is index-aligned with `elements` and carries the deciding
/// rule's index for logging. Re-applying an unchanged resolution is
/// idempotent.
pub fn resolve(elements: &[ResultElement], rules: &[DomainRule]) -> Vec<Resolution> {
    let parts = partition(rules);
    let mut resolutions = vec![Resolution::default(); elements.len()];

    for bucket in [&parts.lazy, &parts.exact, &parts.overrides] {
        // first match in this bucket wins; later buckets still overwrite
        let mut claimed = vec![false; elements.len()];

        for &rule_index in bucket {
            let rule = &rules[rule_index];
            for (i, element) in elements.iter().enumerate() {
                if claimed[i] || !matches(&element.hostname, rule) {
                    continue;
                }
                let action = candidate_action(rule);
                log::debug!(
                    "'{}' matched rule '{}' -> {}",
                    element.hostname,
                    rule.domain,
                    action
                );
                resolutions[i] = Resolution {
                    action,
                    rule_index: Some(rule_index),
                };
                claimed[i] = true;
            }
        }
    }

    resolutions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ResultKind, RuleOpts};

    fn rule(domain: &str, strict: bool, pinned: bool, override_others: bool) -> DomainRule {
        DomainRule {
            domain: domain.into(),
            opts: RuleOpts {
                strict,
                pinned,
                override_others,
            },
        }
    }

    fn element(hostname: &str) -> ResultElement {
        ResultElement::new(ResultKind::Default, hostname)
    }

    #[test]
    fn test_lazy_match_accepts_subdomains() {
        let r = rule("example.com", false, false, false);
        assert!(matches("example.com", &r));
        assert!(matches("sub.example.com", &r));
        assert!(!matches("notexample.com", &r));
    }

    #[test]
    fn test_strict_match_requires_exact_hostname() {
        let r = rule("example.com", true, false, false);
        assert!(matches("example.com", &r));
        assert!(!matches("sub.example.com", &r));
    }

    #[test]
    fn test_match_is_public_suffix_aware() {
        let r = rule("example.co.uk", false, false, false);
        assert!(matches("news.example.co.uk", &r));
        // a last-two-labels heuristic would see "co.uk" here and miss
        assert!(matches("a.b.example.co.uk", &r));
        assert!(!matches("other.co.uk", &r));
    }

    #[test]
    fn test_malformed_hostname_never_matches() {
        let r = rule("example.com", false, false, false);
        assert!(!matches("", &r));
        assert!(!matches("com", &r));
    }

    #[test]
    fn test_strict_rule_can_target_a_subdomain() {
        let r = rule("news.example.com", true, false, false);
        assert!(matches("news.example.com", &r));
        assert!(!matches("example.com", &r));
    }

    #[test]
    fn test_partition_completeness_and_order() {
        let rules = vec![
            rule("a.com", false, false, false),
            rule("b.com", true, false, false),
            rule("c.com", false, true, true),
            rule("d.com", true, false, true),
            rule("e.com", false, true, false),
        ];
        let parts = partition(&rules);

        assert_eq!(parts.lazy, vec![0, 4]);
        assert_eq!(parts.exact, vec![1]);
        assert_eq!(parts.overrides, vec![2, 3]);

        let mut all: Vec<usize> = parts
            .lazy
            .iter()
            .chain(&parts.exact)
            .chain(&parts.overrides)
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_partition_of_empty_rule_set() {
        assert_eq!(partition(&[]), Partition::default());
    }

    #[test]
    fn test_resolve_remove_and_pin() {
        let rules = vec![
            rule("ads.example.com", false, false, false),
            rule("docs.rs", false, true, false),
        ];
        let elements = vec![
            element("tracker.ads.example.com"),
            element("docs.rs"),
            element("example.com"),
        ];

        let resolutions = resolve(&elements, &rules);
        assert_eq!(resolutions[0].action, Action::Remove);
        assert_eq!(resolutions[0].rule_index, Some(0));
        assert_eq!(resolutions[1].action, Action::Pin);
        assert_eq!(resolutions[2].action, Action::None);
        assert_eq!(resolutions[2].rule_index, None);
    }

    #[test]
    fn test_override_cancels_removal() {
        // lazy example.com removes everything under it; the override on the
        // subdomain wins the final pass and neutralizes the removal
        let rules = vec![
            rule("example.com", false, false, false),
            rule("sub.example.com", true, false, true),
        ];
        let elements = vec![element("sub.example.com"), element("other.example.com")];

        let resolutions = resolve(&elements, &rules);
        assert_eq!(resolutions[0].action, Action::None);
        assert_eq!(resolutions[0].rule_index, Some(1));
        assert_eq!(resolutions[1].action, Action::Remove);
    }

    #[test]
    fn test_pinned_override_pins_instead_of_cancelling() {
        let rules = vec![
            rule("example.com", false, false, false),
            rule("sub.example.com", true, true, true),
        ];
        let elements = vec![element("sub.example.com")];

        let resolutions = resolve(&elements, &rules);
        assert_eq!(resolutions[0].action, Action::Pin);
    }

    #[test]
    fn test_exact_bucket_overwrites_lazy_bucket() {
        let rules = vec![
            rule("example.com", false, true, false),
            rule("sub.example.com", true, false, false),
        ];
        let elements = vec![element("sub.example.com"), element("example.com")];

        let resolutions = resolve(&elements, &rules);
        // exact bucket ran later and flipped the pin to a removal
        assert_eq!(resolutions[0].action, Action::Remove);
        assert_eq!(resolutions[1].action, Action::Pin);
    }

    #[test]
    fn test_first_rule_wins_within_a_bucket() {
        let rules = vec![
            rule("example.com", false, false, false),
            rule("example.com", false, true, false),
        ];
        let elements = vec![element("sub.example.com")];

        let resolutions = resolve(&elements, &rules);
        assert_eq!(resolutions[0].action, Action::Remove);
        assert_eq!(resolutions[0].rule_index, Some(0));
    }

    #[test]
    fn test_resolve_is_idempotent_for_unchanged_inputs() {
        let rules = vec![
            rule("example.com", false, false, false),
            rule("pin.example.com", true, true, true),
        ];
        let elements = vec![element("a.example.com"), element("pin.example.com")];

        let first = resolve(&elements, &rules);
        let second = resolve(&elements, &rules);
        assert_eq!(first, second);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let rules = vec![rule("ads.example.com", false, false, false)];
        let elements = vec![element("tracker.ads.example.com"), element("example.com")];

        let resolutions = resolve(&elements, &rules);
        assert_eq!(resolutions[0].action, Action::Remove);
        assert_eq!(resolutions[1].action, Action::None);
    }
}
