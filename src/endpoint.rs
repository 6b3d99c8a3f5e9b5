//! Endpoint records and the storage addressing scheme.
//!
//! A stored endpoint has no identifier of its own: the storage key
//! `<collection>-<method>-<path>` is both its address and its handle.
//! Clients reference an existing record through a base64 round-trip of
//! that key (the "opaque id") so they never need to know the
//! concatenation scheme.

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Separator between the key components.
///
/// The components are NOT escaped: a collection, method, or path that
/// itself contains `-` can collide with a different logical triple.
/// Known limitation, kept for compatibility with existing stored keys.
pub const KEY_SEPARATOR: &str = "-";

/// A stored canned response for one (collection, method, path) triple.
///
/// Serialized as camelCase JSON, the wire and storage format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EndpointRecord {
    /// HTTP verb, stored verbatim. Matching against a live request is
    /// exact byte comparison; inbound methods arrive uppercased from the
    /// transport, so a record stored with a lowercase method is
    /// unreachable.
    pub method: String,

    /// Request path the record answers for, stored verbatim.
    pub path: String,

    /// Response headers, replayed verbatim on match.
    pub headers: HashMap<String, String>,

    /// Response body. A JSON string replays as its raw text; any other
    /// JSON value replays serialized.
    pub body: serde_json::Value,

    /// HTTP status to replay.
    pub status_code: u16,
}

impl EndpointRecord {
    /// Body bytes as they go out on the wire.
    pub fn body_bytes(&self) -> Vec<u8> {
        match &self.body {
            serde_json::Value::String(s) => s.clone().into_bytes(),
            other => other.to_string().into_bytes(),
        }
    }
}

/// Derive the storage key for a (collection, method, path) triple.
///
/// Pure concatenation; the inputs are opaque and unescaped (see
/// [`KEY_SEPARATOR`]).
pub fn endpoint_key(collection: &str, method: &str, path: &str) -> String {
    format!("{collection}{KEY_SEPARATOR}{method}{KEY_SEPARATOR}{path}")
}

/// Encode a storage key as a transport-safe opaque endpoint id.
pub fn encode_endpoint_id(key: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(key)
}

/// Decode an opaque endpoint id back to the storage key it names.
///
/// `None` on undecodable input. Callers fold that into the same
/// invalid-id outcome as a decoded key that is absent from the store; a
/// malformed token is not a distinct error.
pub fn decode_endpoint_id(token: &str) -> Option<String> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(token)
        .ok()?;
    String::from_utf8(bytes).ok()
}

/// The record seeded into every freshly created collection.
///
/// Doubles as the collection existence marker: a collection with this
/// record is distinguishable from one that was never created.
pub fn sample_record() -> EndpointRecord {
    EndpointRecord {
        method: "GET".to_string(),
        path: "/".to_string(),
        headers: HashMap::from([(
            "Content-Type".to_string(),
            "application/json".to_string(),
        )]),
        body: serde_json::json!({
            "message": "Hello Houston, Roketo 🚀 takeoff confirmed!"
        }),
        status_code: 200,
    }
}

/// Key of the seed record for a collection.
pub fn sample_record_key(collection: &str) -> String {
    let seed = sample_record();
    endpoint_key(collection, &seed.method, &seed.path)
}
