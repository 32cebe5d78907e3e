//! Core type definitions for Hypersearch
//!
//! These types map directly to the persisted config record and the
//! per-scan evaluation pipeline.

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// =============================================================================
// Actions
// =============================================================================

/// Action resolved for a matched result element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Action {
    /// Leave the element alone (or cancel a previously resolved action)
    #[default]
    None = 0,
    /// Remove the element from the rendered results
    Remove = 1,
    /// Keep the element visible with a pinned highlight
    Pin = 2,
}

impl TryFrom<u8> for Action {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Remove),
            2 => Ok(Self::Pin),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Remove => "remove",
            Self::Pin => "pin",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Result elements
// =============================================================================

/// Structural kind of a classified result, decides which sub-node
/// receives the injected control affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    /// Plain search result
    #[default]
    Default,
    /// Result with a direct video-slot child
    Video,
    /// Result wrapping an embedded social feed section
    Social,
}

/// Visual state of a result element. Transient, recomputed every scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisualState {
    #[default]
    Neutral,
    Hidden,
    Pinned,
}

impl VisualState {
    /// The state an element ends up in after an action is applied.
    pub fn from_action(action: Action) -> Self {
        match action {
            Action::None => Self::Neutral,
            Action::Remove => Self::Hidden,
            Action::Pin => Self::Pinned,
        }
    }
}

/// A classified result node, paired 1-to-1 with a live DOM element by the
/// caller. Identity does not persist across scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultElement {
    pub kind: ResultKind,
    /// Lower-cased hostname from the result's first anchor, without scheme
    /// or `www.` prefix.
    pub hostname: String,
    pub visual_state: VisualState,
}

impl ResultElement {
    pub fn new(kind: ResultKind, hostname: impl Into<String>) -> Self {
        Self {
            kind,
            hostname: hostname.into(),
            visual_state: VisualState::Neutral,
        }
    }
}

// =============================================================================
// Domain rules
// =============================================================================

/// One configured per-domain preference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct DomainRule {
    /// Registered domain or hostname the rule targets
    pub domain: String,
    // older records used "options" for the same object
    #[serde(default, alias = "options")]
    pub opts: RuleOpts,
}

/// Per-rule option flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct RuleOpts {
    /// Only an exact hostname match qualifies
    #[serde(default)]
    pub strict: bool,
    /// Matches pin rather than remove
    #[serde(default)]
    pub pinned: bool,
    /// Evaluated in the final pass; can neutralize earlier matches
    #[serde(rename = "override", default)]
    pub override_others: bool,
}

impl DomainRule {
    /// Plain hide rule, the shape the content-script hide control writes.
    pub fn hidden(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            opts: RuleOpts::default(),
        }
    }

    /// Pin rule, the shape the content-script pin control writes.
    pub fn pinned(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            opts: RuleOpts {
                pinned: true,
                ..RuleOpts::default()
            },
        }
    }
}

// =============================================================================
// Resolutions
// =============================================================================

/// Outcome of resolving one element against the rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    /// The final action for this element
    pub action: Action,
    /// Index into the input rule list of the deciding rule (for logging)
    pub rule_index: Option<usize>,
}

// =============================================================================
// Card types
// =============================================================================

bitflags::bitflags! {
    /// Auxiliary card kinds on the results page.
    ///
    /// The bit values match the integers older builds persisted under the
    /// `hiddenCards` key.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CardTypes: u32 {
        const DEFINITIONS = 1 << 0;
        const RELATED_QUESTIONS = 1 << 1;
        const RELATED_RESULTS = 1 << 2;
        const NEWS = 1 << 3;
    }
}

impl CardTypes {
    /// Stable serialization name for a single member.
    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::DEFINITIONS => Some("definitions"),
            Self::RELATED_QUESTIONS => Some("related_questions"),
            Self::RELATED_RESULTS => Some("related_results"),
            Self::NEWS => Some("news"),
            _ => None,
        }
    }

    /// Parse a single member from its serialization name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "definitions" => Some(Self::DEFINITIONS),
            "related_questions" => Some(Self::RELATED_QUESTIONS),
            "related_results" => Some(Self::RELATED_RESULTS),
            "news" => Some(Self::NEWS),
            _ => None,
        }
    }
}

// Persisted as a list of member names. Legacy integer bitmasks are still
// accepted on read; unknown bits and names are dropped rather than erroring.
impl Serialize for CardTypes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let names: Vec<&str> = self.iter().filter_map(CardTypes::name).collect();
        names.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CardTypes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CardTypesVisitor;

        impl<'de> Visitor<'de> for CardTypesVisitor {
            type Value = CardTypes;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a list of card type names or a legacy bitmask")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
                Ok(CardTypes::from_bits_truncate(value as u32))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
                Ok(CardTypes::from_bits_truncate(value.max(0) as u32))
            }

            // JS numbers arrive as f64
            fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
                Ok(CardTypes::from_bits_truncate(value.max(0.0) as u32))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut types = CardTypes::empty();
                while let Some(name) = seq.next_element::<String>()? {
                    match CardTypes::from_name(&name) {
                        Some(member) => types |= member,
                        None => log::debug!("ignoring unknown card type '{name}'"),
                    }
                }
                Ok(types)
            }
        }

        deserializer.deserialize_any(CardTypesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_roundtrip() {
        for action in [Action::None, Action::Remove, Action::Pin] {
            assert_eq!(Action::try_from(action as u8), Ok(action));
        }
        assert_eq!(Action::try_from(3), Err(()));
    }

    #[test]
    fn test_rule_opts_accepts_legacy_options_key() {
        let rule: DomainRule = serde_json::from_str(
            r#"{"domain":"example.com","options":{"strict":true,"pinned":false,"override":true}}"#,
        )
        .unwrap();
        assert!(rule.opts.strict);
        assert!(rule.opts.override_others);
    }

    #[test]
    fn test_rule_opts_defaults_when_absent() {
        let rule: DomainRule = serde_json::from_str(r#"{"domain":"example.com"}"#).unwrap();
        assert_eq!(rule.opts, RuleOpts::default());
    }

    #[test]
    fn test_rule_opts_serializes_override_key() {
        let json = serde_json::to_string(&DomainRule::hidden("example.com")).unwrap();
        assert!(json.contains(r#""override":false"#));
    }

    #[test]
    fn test_card_types_from_names() {
        let types: CardTypes =
            serde_json::from_str(r#"["definitions","related_results","bogus"]"#).unwrap();
        assert_eq!(types, CardTypes::DEFINITIONS | CardTypes::RELATED_RESULTS);
    }

    #[test]
    fn test_card_types_from_legacy_bitmask() {
        let types: CardTypes = serde_json::from_str("5").unwrap();
        assert_eq!(types, CardTypes::DEFINITIONS | CardTypes::RELATED_RESULTS);
    }

    #[test]
    fn test_card_types_serialize_as_names() {
        let json = serde_json::to_string(&(CardTypes::RELATED_QUESTIONS | CardTypes::NEWS)).unwrap();
        assert_eq!(json, r#"["related_questions","news"]"#);
    }

    #[test]
    fn test_visual_state_follows_action() {
        assert_eq!(VisualState::from_action(Action::Remove), VisualState::Hidden);
        assert_eq!(VisualState::from_action(Action::Pin), VisualState::Pinned);
        assert_eq!(VisualState::from_action(Action::None), VisualState::Neutral);
    }
}
