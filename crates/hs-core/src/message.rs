//! Cross-context messages
//!
//! Popup, background and content scripts talk through fire-and-forget
//! `{type, payload}` records. Unknown types deserialize to [`Message::Unknown`]
//! and are dropped by every consumer.

use serde::{Deserialize, Serialize};

use crate::types::CardTypes;

/// A message exchanged between extension contexts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Message {
    /// Re-evaluate hidden results against this domain list
    UpdateHiddenResults(Vec<String>),
    /// Re-evaluate hidden cards against this flag set
    UpdateHiddenCards(CardTypes),
    /// Re-evaluate pinned results against this domain list
    UpdatePinnedResults(Vec<String>),
    /// Forward a log line to the receiving context's console
    Log(String),
    /// Anything this build does not understand; treated as a no-op
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_wire_shape() {
        let json = serde_json::to_string(&Message::UpdateHiddenResults(vec![
            "example.com".to_string(),
        ]))
        .unwrap();
        assert_eq!(
            json,
            r#"{"type":"update_hidden_results","payload":["example.com"]}"#
        );
    }

    #[test]
    fn test_message_roundtrip() {
        for message in [
            Message::UpdateHiddenResults(vec!["a.com".into()]),
            Message::UpdateHiddenCards(CardTypes::DEFINITIONS),
            Message::UpdatePinnedResults(vec![]),
            Message::Log("hello".into()),
        ] {
            let json = serde_json::to_string(&message).unwrap();
            assert_eq!(serde_json::from_str::<Message>(&json).unwrap(), message);
        }
    }

    #[test]
    fn test_unknown_type_is_noop_variant() {
        let message: Message =
            serde_json::from_str(r#"{"type":"reticulate_splines","payload":42}"#).unwrap();
        assert_eq!(message, Message::Unknown);
    }

    #[test]
    fn test_cards_payload_accepts_legacy_bitmask() {
        let message: Message =
            serde_json::from_str(r#"{"type":"update_hidden_cards","payload":3}"#).unwrap();
        assert_eq!(
            message,
            Message::UpdateHiddenCards(CardTypes::DEFINITIONS | CardTypes::RELATED_QUESTIONS)
        );
    }
}
