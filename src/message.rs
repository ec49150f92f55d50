//! The message entity and its finalization pipeline

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Violations;
use crate::payload::{JsonContent, MessagePayload, Payloads, content_types};
use crate::signature::{self, HashAlgorithm, SignatureConfig};
use crate::{Result, WebhookerError};

/// A loosely-typed construction object for [`Message::from_parts`]
///
/// Mirrors the request body names except for the payload channels, which use
/// the short `json`/`xml` keys instead of the wire content-type strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageParts {
    /// Tenant key the message will be routed by
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,

    /// Event name the message will be sent as
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,

    /// Payload channels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payloads: Option<Payloads>,
}

/// A single webhook event within the Webhooker system, before and after
/// submission
///
/// A message is created unsent, populated through the chainable `with_*`
/// setters (none of which validate), and finalized with
/// [`to_payload`](Message::to_payload). Finalization never consumes or clears
/// the builder state, so it can be repeated and always derives the same
/// payload for unchanged state.
///
/// The signed variant is a message whose signing configuration is present;
/// [`Message::signed`] creates one, and setting a signing key or hash on an
/// unsigned message creates the configuration as well.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    id: Option<String>,
    tenant: Option<String>,
    event_type: Option<String>,
    payloads: Option<Payloads>,
    signature: Option<SignatureConfig>,
}

impl Message {
    /// Create a message directly from its parts
    ///
    /// This is the only constructor that can leave the payload-channel object
    /// absent entirely, which finalization reports as a missing `payloads`
    /// field rather than missing payload content.
    pub fn new(
        id: Option<String>,
        tenant: Option<String>,
        event_type: Option<String>,
        payloads: Option<Payloads>,
    ) -> Self {
        Self {
            id,
            tenant,
            event_type,
            payloads,
            signature: None,
        }
    }

    /// Hydrate a new unsent message from the provided portable object
    ///
    /// The parts are consumed, so the stored state cannot be affected by the
    /// caller afterwards (and vice versa).
    pub fn from_parts(parts: MessageParts) -> Self {
        Self {
            id: None,
            tenant: parts.tenant,
            event_type: parts.event_type,
            payloads: Some(parts.payloads.unwrap_or_default()),
            signature: None,
        }
    }

    /// Create a blank message as a builder interface
    ///
    /// No defaults are set; the message will not pass validation until values
    /// are set on it.
    pub fn builder() -> Self {
        Self {
            id: None,
            tenant: None,
            event_type: None,
            payloads: Some(Payloads::default()),
            signature: None,
        }
    }

    /// Create a blank message that signs its payloads when finalized
    ///
    /// The signing algorithm defaults to [`HashAlgorithm::Sha256`]; a signing
    /// key must be set before finalization succeeds.
    pub fn signed() -> Self {
        Self {
            signature: Some(SignatureConfig::default()),
            ..Self::builder()
        }
    }

    /// Hydrate a new unsent signing message from the provided portable object
    pub fn signed_from_parts(parts: MessageParts) -> Self {
        Self {
            signature: Some(SignatureConfig::default()),
            ..Self::from_parts(parts)
        }
    }

    /// Set the id of the message
    ///
    /// Generally not needed outside the SDK, but useful for rehydrating a
    /// serialized message. Note that [`is_sent`](Message::is_sent) treats any
    /// present id as proof of submission.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the tenant key the message will be routed by
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Set the event name the message will be sent as (e.g. `task.created`)
    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Set the JSON payload channel
    ///
    /// Accepts either a structured [`serde_json::Value`] to be serialized at
    /// finalization, or a pre-serialized string that is passed through (and
    /// signed) verbatim.
    pub fn with_json(mut self, json: impl Into<JsonContent>) -> Self {
        self.payloads.get_or_insert_with(Payloads::default).json = Some(json.into());
        self
    }

    /// Set the XML payload channel; the string is sent as-is
    pub fn with_xml(mut self, xml: impl Into<String>) -> Self {
        self.payloads.get_or_insert_with(Payloads::default).xml = Some(xml.into());
        self
    }

    /// Set the key used to sign the request payloads
    ///
    /// It is recommended that this value is not related to your Webhooker
    /// account in any way. Setting a key on an unsigned message turns it into
    /// the signed variant.
    pub fn with_signing_key(mut self, key: impl Into<String>) -> Self {
        self.signature.get_or_insert_with(SignatureConfig::default).key = Some(key.into());
        self
    }

    /// Set the algorithm used to sign the request payloads
    ///
    /// Parse a [`HashAlgorithm`] from a name first when the algorithm comes
    /// from configuration; unsupported names fail there rather than here.
    pub fn with_signing_hash(mut self, algorithm: HashAlgorithm) -> Self {
        self.signature
            .get_or_insert_with(SignatureConfig::default)
            .algorithm = algorithm;
        self
    }

    /// The id assigned by the server, if the message has been sent
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The tenant key, if set
    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    /// The event name, if set
    pub fn event_type(&self) -> Option<&str> {
        self.event_type.as_deref()
    }

    /// Whether this message signs its payloads at finalization
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Check whether this message has been successfully sent
    ///
    /// Sent state is indicated solely by the existence of an id. If an id has
    /// been manually set on an unsent message, this method will falsely
    /// report that the message has been sent - only sent messages should have
    /// an id.
    pub fn is_sent(&self) -> bool {
        self.id.is_some()
    }

    /// Write an id onto this message in place
    ///
    /// The client calls this with the server-issued id when a submission
    /// succeeds, transitioning the same caller-held instance to sent.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Turn this message into the raw payload used as the body of a send
    /// request
    ///
    /// Runs assembly, then validation, then signing for the signed variant.
    /// Validation collects every violated rule before failing, so the error
    /// carries all defects at once. The builder state is left untouched.
    pub fn to_payload(&self) -> Result<MessagePayload> {
        let mut violations = Violations::new();
        let mut payload = BTreeMap::new();

        match &self.payloads {
            Some(payloads) => {
                if let Some(json) = &payloads.json {
                    let body = match json {
                        JsonContent::Text(text) => text.clone(),
                        JsonContent::Value(value) => serde_json::to_string(value)?,
                    };
                    payload.insert(content_types::JSON.to_string(), body);
                }
                if let Some(xml) = &payloads.xml {
                    payload.insert(content_types::XML.to_string(), xml.clone());
                }
                if payloads.is_empty() {
                    violations.add("payloads content", "missing at least one of: json, xml");
                }
            }
            None => violations.add("payloads", "missing required field"),
        }

        if self.event_type.is_none() {
            violations.add("type", "missing required field");
        }

        if !violations.is_empty() {
            return Err(WebhookerError::InvalidMessage(violations));
        }

        let signatures = match &self.signature {
            Some(config) => Some(Self::sign_payload(&payload, config)?),
            None => None,
        };

        Ok(MessagePayload {
            id: self.id.clone(),
            tenant: self.tenant.clone(),
            event_type: self
                .event_type
                .clone()
                .expect("type presence is validated above"),
            payload,
            signatures,
        })
    }

    /// Compute one digest per content type present in the assembled payload
    ///
    /// Runs only after base validation has passed; a missing or empty key is
    /// its own violation rather than a silent skip.
    fn sign_payload(
        payload: &BTreeMap<String, String>,
        config: &SignatureConfig,
    ) -> Result<BTreeMap<String, String>> {
        let key = match config.key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => {
                let mut violations = Violations::new();
                violations.add("signingKey", "missing required field");
                return Err(WebhookerError::InvalidMessage(violations));
            }
        };

        Ok(payload
            .iter()
            .map(|(content_type, body)| {
                (
                    content_type.clone(),
                    signature::sign(config.algorithm, key, body),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parts_with_json(value: serde_json::Value) -> MessageParts {
        MessageParts {
            tenant: Some("customer-42".to_string()),
            event_type: Some("task.created".to_string()),
            payloads: Some(Payloads {
                json: Some(value.into()),
                xml: None,
            }),
        }
    }

    #[test]
    fn test_builder_chain_round_trip() {
        let data = json!({"task": "ship it", "priority": 3});
        let message = Message::builder()
            .with_tenant("customer-42")
            .with_event_type("task.created")
            .with_json(data.clone());

        let payload = message.to_payload().unwrap();
        assert_eq!(payload.tenant.as_deref(), Some("customer-42"));
        assert_eq!(payload.event_type, "task.created");
        assert_eq!(
            payload.payload.get(content_types::JSON).map(String::as_str),
            Some(serde_json::to_string(&data).unwrap().as_str())
        );
        assert!(payload.signatures.is_none());
    }

    #[test]
    fn test_finalization_is_idempotent() {
        let message = Message::from_parts(parts_with_json(json!({"a": [1, 2, 3]})));

        let first = message.to_payload().unwrap();
        let second = message.to_payload().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_from_parts_isolated_from_caller_state() {
        let mut parts = parts_with_json(json!({"state": "original"}));
        let message = Message::from_parts(parts.clone());

        parts.payloads.as_mut().unwrap().json = Some(json!({"state": "mutated"}).into());
        parts.event_type = Some("task.deleted".to_string());

        let payload = message.to_payload().unwrap();
        assert_eq!(payload.event_type, "task.created");
        assert_eq!(
            payload.payload.get(content_types::JSON).map(String::as_str),
            Some(r#"{"state":"original"}"#)
        );
    }

    #[test]
    fn test_pre_serialized_json_passes_through_verbatim() {
        // Deliberately not valid JSON: pre-serialized content is trusted
        // as-is, never re-parsed.
        let message = Message::builder()
            .with_event_type("task.created")
            .with_json("not actually json");

        let payload = message.to_payload().unwrap();
        assert_eq!(
            payload.payload.get(content_types::JSON).map(String::as_str),
            Some("not actually json")
        );
    }

    #[test]
    fn test_xml_passes_through_verbatim() {
        let message = Message::builder()
            .with_event_type("task.created")
            .with_xml("<task><name>ship it</name></task>");

        let payload = message.to_payload().unwrap();
        assert_eq!(
            payload.payload.get(content_types::XML).map(String::as_str),
            Some("<task><name>ship it</name></task>")
        );
        assert!(!payload.payload.contains_key(content_types::JSON));
    }

    #[test]
    fn test_validation_reports_every_violation() {
        let message = Message::from_parts(MessageParts {
            tenant: Some("x".to_string()),
            ..MessageParts::default()
        });

        let err = message.to_payload().unwrap_err();
        match err {
            WebhookerError::InvalidMessage(violations) => {
                assert_eq!(violations.len(), 2);
                assert!(violations.contains("type"));
                assert!(violations.contains("payloads content"));
            }
            other => panic!("expected InvalidMessage, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_payloads_object_is_its_own_violation() {
        let message = Message::new(
            None,
            Some("customer-42".to_string()),
            Some("task.created".to_string()),
            None,
        );

        let err = message.to_payload().unwrap_err();
        match err {
            WebhookerError::InvalidMessage(violations) => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations.get("payloads"), Some("missing required field"));
            }
            other => panic!("expected InvalidMessage, got {other:?}"),
        }
    }

    #[test]
    fn test_failed_finalization_leaves_builder_usable() {
        let message = Message::builder().with_tenant("customer-42");
        assert!(message.to_payload().is_err());

        // State survives the failure; fixing the fields makes the same
        // builder finalize.
        let message = message
            .with_event_type("task.created")
            .with_json(json!({"ok": true}));
        assert!(message.to_payload().is_ok());
    }

    #[test]
    fn test_signed_message_requires_signing_key() {
        let message = Message::signed()
            .with_event_type("task.created")
            .with_json(json!({"ok": true}));

        let err = message.to_payload().unwrap_err();
        match err {
            WebhookerError::InvalidMessage(violations) => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations.get("signingKey"), Some("missing required field"));
            }
            other => panic!("expected InvalidMessage, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_signing_key_is_rejected() {
        let message = Message::signed()
            .with_event_type("task.created")
            .with_json(json!({"ok": true}))
            .with_signing_key("");

        let err = message.to_payload().unwrap_err();
        match err {
            WebhookerError::InvalidMessage(violations) => {
                assert!(violations.contains("signingKey"));
            }
            other => panic!("expected InvalidMessage, got {other:?}"),
        }
    }

    #[test]
    fn test_base_violations_reported_before_signing_key() {
        // An invalid signed message reports the payload violations first; the
        // signing key check only runs once base validation has passed.
        let err = Message::signed().to_payload().unwrap_err();
        match err {
            WebhookerError::InvalidMessage(violations) => {
                assert!(violations.contains("type"));
                assert!(!violations.contains("signingKey"));
            }
            other => panic!("expected InvalidMessage, got {other:?}"),
        }
    }

    #[test]
    fn test_signatures_cover_only_present_channels() {
        let message = Message::signed()
            .with_event_type("task.created")
            .with_json(json!({"ok": true}))
            .with_signing_key("shared-secret");

        let payload = message.to_payload().unwrap();
        let signatures = payload.signatures.unwrap();
        assert!(signatures.contains_key(content_types::JSON));
        assert!(!signatures.contains_key(content_types::XML));
    }

    #[test]
    fn test_signature_matches_wire_content() {
        let message = Message::signed()
            .with_event_type("invoice.paid")
            .with_json(json!({"invoice": 7}))
            .with_xml("<invoice>7</invoice>")
            .with_signing_key("shared-secret");

        let payload = message.to_payload().unwrap();
        let signatures = payload.signatures.unwrap();

        let json_body = payload.payload.get(content_types::JSON).unwrap();
        assert_eq!(
            signatures.get(content_types::JSON).map(String::as_str),
            Some(signature::sign(HashAlgorithm::Sha256, "shared-secret", json_body).as_str())
        );
        assert_eq!(
            signatures.get(content_types::XML).map(String::as_str),
            Some(
                signature::sign(HashAlgorithm::Sha256, "shared-secret", "<invoice>7</invoice>")
                    .as_str()
            )
        );
    }

    #[test]
    fn test_signing_hash_setter_changes_algorithm() {
        let message = Message::signed()
            .with_event_type("task.created")
            .with_xml("<task/>")
            .with_signing_key("shared-secret")
            .with_signing_hash(HashAlgorithm::Sha512);

        let payload = message.to_payload().unwrap();
        let signatures = payload.signatures.unwrap();
        assert_eq!(
            signatures.get(content_types::XML).map(String::as_str),
            Some(signature::sign(HashAlgorithm::Sha512, "shared-secret", "<task/>").as_str())
        );
    }

    #[test]
    fn test_signing_key_upgrades_unsigned_message() {
        let message = Message::builder()
            .with_event_type("task.created")
            .with_json(json!({"ok": true}))
            .with_signing_key("shared-secret");

        assert!(message.is_signed());
        assert!(message.to_payload().unwrap().signatures.is_some());
    }

    #[test]
    fn test_signed_from_parts_requires_key_like_blank_signed() {
        let message = Message::signed_from_parts(parts_with_json(json!({"ok": true})));
        assert!(message.is_signed());
        assert!(message.to_payload().is_err());

        let payload = message
            .with_signing_key("shared-secret")
            .to_payload()
            .unwrap();
        assert!(payload.signatures.is_some());
    }

    #[test]
    fn test_sent_state_follows_id_presence() {
        let mut message = Message::from_parts(parts_with_json(json!({"ok": true})));
        assert!(!message.is_sent());
        assert_eq!(message.id(), None);
        assert_eq!(message.tenant(), Some("customer-42"));
        assert_eq!(message.event_type(), Some("task.created"));

        message.set_id("abc");
        assert!(message.is_sent());
        assert_eq!(message.id(), Some("abc"));
    }

    #[test]
    fn test_manually_set_id_fools_sent_check() {
        // Documented behavior: id presence is the sole sent signal.
        let message = Message::builder().with_id("not-really-sent");
        assert!(message.is_sent());
    }

    #[test]
    fn test_id_carried_into_payload() {
        let message = Message::from_parts(parts_with_json(json!({"ok": true}))).with_id("abc");
        let payload = message.to_payload().unwrap();
        assert_eq!(payload.id.as_deref(), Some("abc"));
    }
}
