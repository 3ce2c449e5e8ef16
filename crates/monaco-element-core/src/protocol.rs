//! The cross-frame message vocabulary.
//!
//! Every message between host and sandbox is a single [`Envelope`] serialized
//! as JSON text: `{"event": "<kind>", "payload": <any>}`. [`Message`] is the
//! typed form; decoding validates both the event kind and the payload type,
//! so handlers never see a half-valid message.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smol_str::SmolStr;

use crate::error::ProtocolError;
use crate::layout::bound_from_px;

/// The closed set of event names both endpoints understand.
///
/// Adding a kind requires shipping host and sandbox together; a peer that
/// does not know a kind drops the message with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Ready,
    ValueChanged,
    LanguageChanged,
    ThemeChanged,
    AutogrowChanged,
    HeightChanged,
    MaxHeightChanged,
    MinHeightChanged,
    /// Sandbox could not load the engine. Terminal.
    LoadFailed,
}

impl EventKind {
    pub const ALL: [EventKind; 9] = [
        EventKind::Ready,
        EventKind::ValueChanged,
        EventKind::LanguageChanged,
        EventKind::ThemeChanged,
        EventKind::AutogrowChanged,
        EventKind::HeightChanged,
        EventKind::MaxHeightChanged,
        EventKind::MinHeightChanged,
        EventKind::LoadFailed,
    ];

    /// Wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Ready => "ready",
            EventKind::ValueChanged => "valueChanged",
            EventKind::LanguageChanged => "languageChanged",
            EventKind::ThemeChanged => "themeChanged",
            EventKind::AutogrowChanged => "autogrowChanged",
            EventKind::HeightChanged => "heightChanged",
            EventKind::MaxHeightChanged => "maxHeightChanged",
            EventKind::MinHeightChanged => "minHeightChanged",
            EventKind::LoadFailed => "loadFailed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ProtocolError::UnknownEvent(SmolStr::new(s)))
    }
}

/// Raw wire envelope.
///
/// `event` is kept as a string here so that an unknown kind can be told apart
/// from text that is not an envelope at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub event: SmolStr,
    #[serde(default)]
    pub payload: Value,
}

/// A validated protocol message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Sandbox finished creating the editor and accepts state.
    Ready,
    ValueChanged(String),
    LanguageChanged(SmolStr),
    ThemeChanged(SmolStr),
    AutogrowChanged(bool),
    /// Height in pixels the sandbox resized itself to.
    HeightChanged(u32),
    /// `None` clears the bound.
    MaxHeightChanged(Option<u32>),
    MinHeightChanged(Option<u32>),
    LoadFailed(String),
}

impl Message {
    pub fn kind(&self) -> EventKind {
        match self {
            Message::Ready => EventKind::Ready,
            Message::ValueChanged(_) => EventKind::ValueChanged,
            Message::LanguageChanged(_) => EventKind::LanguageChanged,
            Message::ThemeChanged(_) => EventKind::ThemeChanged,
            Message::AutogrowChanged(_) => EventKind::AutogrowChanged,
            Message::HeightChanged(_) => EventKind::HeightChanged,
            Message::MaxHeightChanged(_) => EventKind::MaxHeightChanged,
            Message::MinHeightChanged(_) => EventKind::MinHeightChanged,
            Message::LoadFailed(_) => EventKind::LoadFailed,
        }
    }

    /// Build the wire envelope for this message.
    pub fn to_envelope(&self) -> Envelope {
        let payload = match self {
            Message::Ready => Value::Null,
            Message::ValueChanged(value) | Message::LoadFailed(value) => {
                Value::String(value.clone())
            }
            Message::LanguageChanged(id) | Message::ThemeChanged(id) => {
                Value::String(id.to_string())
            }
            Message::AutogrowChanged(on) => Value::Bool(*on),
            Message::HeightChanged(px) => Value::from(*px),
            Message::MaxHeightChanged(bound) | Message::MinHeightChanged(bound) => {
                bound.map(Value::from).unwrap_or(Value::Null)
            }
        };
        Envelope {
            event: SmolStr::new_static(self.kind().as_str()),
            payload,
        }
    }

    /// Serialize to the JSON text sent across the frame boundary.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(&self.to_envelope()).map_err(ProtocolError::Encode)
    }

    /// Parse and validate a message received from the peer.
    ///
    /// Only a JSON object is an envelope; `[event, payload]` arrays are
    /// malformed.
    pub fn decode(text: &str) -> Result<Message, ProtocolError> {
        let object: Map<String, Value> =
            serde_json::from_str(text).map_err(ProtocolError::Malformed)?;
        let envelope: Envelope =
            serde_json::from_value(Value::Object(object)).map_err(ProtocolError::Malformed)?;
        Message::from_envelope(envelope)
    }

    pub fn from_envelope(envelope: Envelope) -> Result<Message, ProtocolError> {
        let kind: EventKind = envelope.event.parse()?;
        let payload = envelope.payload;
        let msg = match kind {
            EventKind::Ready => Message::Ready,
            EventKind::ValueChanged => Message::ValueChanged(expect_string(kind, payload)?),
            EventKind::LanguageChanged => {
                Message::LanguageChanged(expect_string(kind, payload)?.into())
            }
            EventKind::ThemeChanged => Message::ThemeChanged(expect_string(kind, payload)?.into()),
            EventKind::AutogrowChanged => match payload {
                Value::Bool(on) => Message::AutogrowChanged(on),
                _ => return Err(invalid(kind, "boolean")),
            },
            EventKind::HeightChanged => match payload.as_f64() {
                Some(px) if px >= 0.0 => Message::HeightChanged(bound_from_px(px).unwrap_or(0)),
                _ => return Err(invalid(kind, "non-negative number")),
            },
            EventKind::MaxHeightChanged => Message::MaxHeightChanged(expect_bound(kind, payload)?),
            EventKind::MinHeightChanged => Message::MinHeightChanged(expect_bound(kind, payload)?),
            EventKind::LoadFailed => Message::LoadFailed(expect_string(kind, payload)?),
        };
        Ok(msg)
    }
}

fn invalid(kind: EventKind, expected: &'static str) -> ProtocolError {
    ProtocolError::InvalidPayload {
        event: kind.as_str(),
        expected,
    }
}

fn expect_string(kind: EventKind, payload: Value) -> Result<String, ProtocolError> {
    match payload {
        Value::String(s) => Ok(s),
        _ => Err(invalid(kind, "string")),
    }
}

/// Height bounds: `null` and non-positive numbers both mean "unset".
fn expect_bound(kind: EventKind, payload: Value) -> Result<Option<u32>, ProtocolError> {
    match payload {
        Value::Null => Ok(None),
        Value::Number(n) => match n.as_f64() {
            Some(px) => Ok(bound_from_px(px)),
            None => Err(invalid(kind, "number or null")),
        },
        _ => Err(invalid(kind, "number or null")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_names_round_trip() {
        for kind in EventKind::ALL {
            assert_eq!(kind.as_str().parse::<EventKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_event_kind_serde_matches_wire_name() {
        let json = serde_json::to_string(&EventKind::MaxHeightChanged).unwrap();
        assert_eq!(json, "\"maxHeightChanged\"");
    }

    #[test]
    fn test_wire_format_snapshot() {
        let envelopes: Vec<Envelope> = vec![
            Message::Ready,
            Message::ValueChanged("hello world".into()),
            Message::LanguageChanged("python".into()),
            Message::ThemeChanged("vs-dark".into()),
            Message::AutogrowChanged(true),
            Message::HeightChanged(300),
            Message::MaxHeightChanged(Some(300)),
            Message::MinHeightChanged(None),
            Message::LoadFailed("script error".into()),
        ]
        .iter()
        .map(Message::to_envelope)
        .collect();
        insta::assert_yaml_snapshot!(envelopes);
    }

    #[test]
    fn test_encode_is_flat_json() {
        let text = Message::ValueChanged("a\"b".into()).encode().unwrap();
        assert_eq!(text, r#"{"event":"valueChanged","payload":"a\"b"}"#);
        let text = Message::Ready.encode().unwrap();
        assert_eq!(text, r#"{"event":"ready","payload":null}"#);
    }

    #[test]
    fn test_payload_types_survive_transport() {
        let msgs = [
            Message::ValueChanged("tab\tnewline\n unicode 🌍".into()),
            Message::AutogrowChanged(false),
            Message::HeightChanged(0),
            Message::MaxHeightChanged(Some(1)),
            Message::MinHeightChanged(None),
        ];
        for msg in msgs {
            let decoded = Message::decode(&msg.encode().unwrap()).unwrap();
            assert_eq!(decoded, msg);
        }
    }

    #[test]
    fn test_decode_missing_payload_is_null() {
        assert_eq!(Message::decode(r#"{"event":"ready"}"#).unwrap(), Message::Ready);
        assert!(matches!(
            Message::decode(r#"{"event":"maxHeightChanged"}"#),
            Ok(Message::MaxHeightChanged(None))
        ));
    }

    #[test]
    fn test_decode_negative_bound_is_unset() {
        let msg = Message::decode(r#"{"event":"maxHeightChanged","payload":-1}"#).unwrap();
        assert_eq!(msg, Message::MaxHeightChanged(None));
    }

    #[test]
    fn test_decode_fractional_height_rounds() {
        let msg = Message::decode(r#"{"event":"heightChanged","payload":189.6}"#).unwrap();
        assert_eq!(msg, Message::HeightChanged(190));
    }

    #[test]
    fn test_decode_unknown_event() {
        match Message::decode(r#"{"event":"sizeChanged","payload":10}"#) {
            Err(ProtocolError::UnknownEvent(name)) => assert_eq!(name, "sizeChanged"),
            other => panic!("expected UnknownEvent, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(
            Message::decode("not json"),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            Message::decode(r#"{"payload":"missing event"}"#),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            Message::decode("[1,2,3]"),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_rejects_array_envelope() {
        assert!(matches!(
            Message::decode(r#"["ready",null]"#),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            Message::decode(r#"["valueChanged","text"]"#),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_wrong_payload_type() {
        match Message::decode(r#"{"event":"autogrowChanged","payload":"yes"}"#) {
            Err(ProtocolError::InvalidPayload { event, expected }) => {
                assert_eq!(event, "autogrowChanged");
                assert_eq!(expected, "boolean");
            }
            other => panic!("expected InvalidPayload, got {other:?}"),
        }
        assert!(Message::decode(r#"{"event":"valueChanged","payload":null}"#).is_err());
        assert!(Message::decode(r#"{"event":"heightChanged","payload":-5}"#).is_err());
    }
}
