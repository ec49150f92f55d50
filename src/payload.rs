//! Wire payload types for the Webhooker messages API

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Content-type keys used in the `payload` and `signatures` maps
///
/// The wire format keys each serialized body by a MIME-style string so it
/// stays self-describing and can grow further content kinds without
/// renegotiation.
pub mod content_types {
    /// Key for the stringified JSON body
    pub const JSON: &str = "application/json";

    /// Key for the stringified XML body
    pub const XML: &str = "application/xml";
}

/// Content for the JSON payload channel
///
/// A `Text` value is assumed to be pre-serialized JSON and is copied onto the
/// wire (and signed) verbatim, without re-validation. A `Value` is serialized
/// compactly when the payload is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonContent {
    /// A pre-serialized JSON string
    Text(String),

    /// A structured value, serialized at finalization
    Value(serde_json::Value),
}

impl From<String> for JsonContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for JsonContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<serde_json::Value> for JsonContent {
    fn from(value: serde_json::Value) -> Self {
        Self::Value(value)
    }
}

/// The payload channels of an unsent message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payloads {
    /// JSON channel content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<JsonContent>,

    /// Pre-serialized XML channel content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xml: Option<String>,
}

impl Payloads {
    /// Check whether neither channel is set
    pub fn is_empty(&self) -> bool {
        self.json.is_none() && self.xml.is_none()
    }
}

/// The wire-ready body of a `POST /messages` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    /// Server-issued message identifier; `null` until the message is sent
    #[serde(default)]
    pub id: Option<String>,

    /// Tenant key used to route the message to matching subscriptions
    #[serde(default)]
    pub tenant: Option<String>,

    /// Event name the message is sent as (e.g. `task.created`)
    #[serde(rename = "type")]
    pub event_type: String,

    /// Serialized bodies keyed by content type
    pub payload: BTreeMap<String, String>,

    /// Hex HMAC digests keyed by content type; present only for signed
    /// messages, and only for the channels that exist in `payload`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signatures: Option<BTreeMap<String, String>>,
}

impl MessagePayload {
    /// Serialize to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
