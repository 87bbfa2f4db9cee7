//! JSON envelopes exchanged with TCP clients and the application channel.
//!
//! The bridge only interprets `id`. Everything else (`type`, `name`, `args`,
//! `ok`, `error` and any result fields) is carried through untouched so the
//! application's reply reaches the client verbatim.

use std::fmt;
use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

const PREVIEW_LIMIT: usize = 500;
const PREVIEW_SUFFIX: &str = "...(trunc)";

/// Correlation identifier shared by a request and its reply.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Wraps an identifier supplied by a client or the application.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Derives an identifier for a client that did not supply one.
    ///
    /// Peer address, peer port and a millisecond timestamp are unique in
    /// practice because the OS never hands the same source port to two live
    /// connections.
    #[must_use]
    pub fn for_peer(peer: SocketAddr, at: SystemTime) -> Self {
        let millis = at
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        Self(format!("tcp-{}-{}-{millis}", peer.ip(), peer.port()))
    }

    /// Borrows the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A JSON object keyed by an optional correlation `id`.
///
/// Only a non-empty string counts as an id; any other `id` value is dropped
/// and the envelope is treated as uncorrelated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(
        default,
        deserialize_with = "usable_id",
        skip_serializing_if = "Option::is_none"
    )]
    id: Option<RequestId>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl Envelope {
    /// Parses a JSON object.
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Converts an already parsed JSON value; fails unless it is an object.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Builds an envelope from an id and the remaining fields.
    #[must_use]
    pub fn from_parts(id: Option<RequestId>, fields: Map<String, Value>) -> Self {
        Self { id, fields }
    }

    /// Builds the bridge's own error reply: `{"ok": false, "id"?, "error"}`.
    #[must_use]
    pub fn failure(id: Option<RequestId>, error: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("ok".to_owned(), Value::Bool(false));
        fields.insert("error".to_owned(), Value::String(error.into()));
        Self { id, fields }
    }

    /// The correlation id, when present.
    #[must_use]
    pub fn id(&self) -> Option<&RequestId> {
        self.id.as_ref()
    }

    /// Replaces the correlation id.
    pub fn set_id(&mut self, id: RequestId) {
        self.id = Some(id);
    }

    /// The `type` tag, for example `RUN`.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.fields.get("type").and_then(Value::as_str)
    }

    /// The operation name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }

    /// Positional arguments; empty when absent or not an array.
    #[must_use]
    pub fn args(&self) -> &[Value] {
        self.fields
            .get("args")
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice)
    }

    /// The `ok` flag carried by replies.
    #[must_use]
    pub fn ok(&self) -> Option<bool> {
        self.fields.get("ok").and_then(Value::as_bool)
    }

    /// The `error` message carried by failed replies.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.fields.get("error").and_then(Value::as_str)
    }

    /// Looks up any other field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Compact JSON encoding.
    pub fn to_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Log-friendly rendering capped at 500 characters.
    #[must_use]
    pub fn preview(&self) -> String {
        match serde_json::to_string(self) {
            Ok(text) => truncate_preview(text),
            Err(_) => "<unserializable>".to_owned(),
        }
    }
}

fn usable_id<'de, D>(deserializer: D) -> Result<Option<RequestId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) if !text.is_empty() => Some(RequestId(text)),
        _ => None,
    })
}

fn truncate_preview(mut text: String) -> String {
    if let Some((cut, _)) = text.char_indices().nth(PREVIEW_LIMIT) {
        text.truncate(cut);
        text.push_str(PREVIEW_SUFFIX);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn parse_keeps_unknown_fields() {
        let envelope =
            Envelope::parse(br#"{"type":"RUN","name":"send","args":["hello",0],"extra":1}"#)
                .expect("parse");
        assert_eq!(envelope.id(), None);
        assert_eq!(envelope.kind(), Some("RUN"));
        assert_eq!(envelope.name(), Some("send"));
        assert_eq!(envelope.args(), &[json!("hello"), json!(0)]);
        assert_eq!(envelope.field("extra"), Some(&json!(1)));
    }

    #[rstest]
    #[case::empty(br#"{"id":"","type":"RUN"}"#.as_slice())]
    #[case::null(br#"{"id":null,"type":"RUN"}"#.as_slice())]
    #[case::number(br#"{"id":7,"type":"RUN"}"#.as_slice())]
    #[case::object(br#"{"id":{"n":1},"type":"RUN"}"#.as_slice())]
    fn unusable_ids_count_as_absent(#[case] raw: &[u8]) {
        let envelope = Envelope::parse(raw).expect("parse");
        assert!(envelope.id().is_none());
        assert_eq!(envelope.kind(), Some("RUN"));
        assert_eq!(envelope.field("id"), None);
    }

    #[rstest]
    #[case::array(b"[1,2]".as_slice())]
    #[case::string(br#""hello""#.as_slice())]
    #[case::garbage(b"not json".as_slice())]
    fn rejects_non_envelopes(#[case] raw: &[u8]) {
        assert!(Envelope::parse(raw).is_err());
    }

    #[test]
    fn failure_serialises_ok_false() {
        let envelope = Envelope::failure(Some(RequestId::from("A")), "timeout");
        let value: Value = serde_json::from_slice(&envelope.to_vec().expect("encode"))
            .expect("decode");
        assert_eq!(value, json!({"ok": false, "id": "A", "error": "timeout"}));
    }

    #[test]
    fn failure_without_id_omits_the_field() {
        let envelope = Envelope::failure(None, "bad");
        let value: Value = serde_json::from_slice(&envelope.to_vec().expect("encode"))
            .expect("decode");
        assert_eq!(value, json!({"ok": false, "error": "bad"}));
    }

    #[test]
    fn synthesised_ids_embed_peer_and_millis() {
        let peer: SocketAddr = "127.0.0.1:51000".parse().expect("addr");
        let at = UNIX_EPOCH + Duration::from_millis(1_700_000_000_000);
        assert_eq!(
            RequestId::for_peer(peer, at).as_str(),
            "tcp-127.0.0.1-51000-1700000000000"
        );
    }

    #[test]
    fn preview_truncates_long_payloads() {
        let envelope = Envelope::failure(None, "x".repeat(2_000));
        let preview = envelope.preview();
        assert!(preview.ends_with(PREVIEW_SUFFIX));
        assert_eq!(preview.chars().count(), PREVIEW_LIMIT + PREVIEW_SUFFIX.len());
    }
}
