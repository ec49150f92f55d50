//! Error types for Webhooker operations

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Errors that can occur while building, signing, or sending messages
#[derive(Error, Debug)]
pub enum WebhookerError {
    /// The message failed payload validation
    #[error("invalid message object:\n{0}")]
    InvalidMessage(Violations),

    /// An unsupported hash algorithm name was supplied
    #[error("{value} is not a valid hash. Valid values include: {}", .supported.join(", "))]
    InvalidHashAlgorithm {
        /// The offending algorithm name
        value: String,

        /// The algorithm names the signer supports
        supported: Vec<&'static str>,
    },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Payload serialization failed
    #[error("Payload error: {0}")]
    Payload(String),
}

impl From<serde_json::Error> for WebhookerError {
    fn from(err: serde_json::Error) -> Self {
        WebhookerError::Payload(err.to_string())
    }
}

/// Validation failures collected during message finalization, keyed by the
/// violated field
///
/// Every failed rule contributes one entry, so a caller sees all defects in a
/// single error rather than fixing one field per attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations {
    entries: BTreeMap<String, String>,
}

impl Violations {
    /// Create an empty violation set
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation for a field
    pub fn add(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.entries.insert(field.into(), reason.into());
    }

    /// Check if any violations were recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the number of violations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether a field was violated
    pub fn contains(&self, field: &str) -> bool {
        self.entries.contains_key(field)
    }

    /// Get the reason recorded for a field
    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries.get(field).map(String::as_str)
    }

    /// Iterate over `(field, reason)` pairs in field order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(field, reason)| (field.as_str(), reason.as_str()))
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (field, reason) in &self.entries {
            writeln!(f, "\t- {}: {}", field, reason)?;
        }
        Ok(())
    }
}
