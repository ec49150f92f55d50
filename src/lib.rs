//! Rust client SDK for the Webhooker API
//!
//! Webhooker relays webhook events to every subscription whose tenant key
//! matches the one on the message. This crate builds those messages, signs
//! their payloads when asked to, and submits them to the API, writing the
//! server-issued id back onto the originating message.
//!
//! # Features
//!
//! - **Fluent message building**: chainable setters over a plain builder,
//!   with validation deferred to finalization
//! - **Aggregated validation**: every violated field is reported in one
//!   error, not just the first
//! - **Payload signing**: per-channel HMAC digests (SHA-256 by default) over
//!   the exact wire bytes, so recipients can verify what they receive
//! - **Sent-state tracking**: a successful send marks the caller-held
//!   message instance with the id the server assigned
//!
//! # Example: Sending a Message
//!
//! ```rust,no_run
//! use webhooker::{Message, WebhookerClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = WebhookerClient::with_key("my-api-key");
//!
//!     let mut message = Message::builder()
//!         .with_tenant("customer-42")
//!         .with_event_type("task.created")
//!         .with_json(serde_json::json!({ "task": "ship it" }));
//!
//!     let id = client.send(&mut message).await?;
//!     assert!(message.is_sent());
//!     println!("message accepted as {id}");
//!     Ok(())
//! }
//! ```
//!
//! # Example: Signing Payloads
//!
//! ```rust
//! use webhooker::{HashAlgorithm, Message};
//!
//! let payload = Message::signed()
//!     .with_tenant("customer-42")
//!     .with_event_type("invoice.paid")
//!     .with_json(r#"{"invoice": 7}"#)
//!     .with_signing_key("shared-secret")
//!     .with_signing_hash(HashAlgorithm::Sha512)
//!     .to_payload()?;
//!
//! assert!(payload.signatures.is_some());
//! # Ok::<(), webhooker::WebhookerError>(())
//! ```

mod client;
mod config;
mod error;
mod message;
mod payload;
mod signature;

pub use client::WebhookerClient;
pub use config::{Config, ConfigBuilder, DEFAULT_DOMAIN};
pub use error::{Violations, WebhookerError};
pub use message::{Message, MessageParts};
pub use payload::{JsonContent, MessagePayload, Payloads, content_types};
pub use signature::{HashAlgorithm, SignatureConfig, sign};

/// Result type for Webhooker operations
pub type Result<T> = std::result::Result<T, WebhookerError>;
