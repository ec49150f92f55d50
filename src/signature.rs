//! Payload signature generation

use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};

use crate::WebhookerError;

type HmacSha256 = Hmac<Sha256>;
type HmacSha384 = Hmac<Sha384>;
type HmacSha512 = Hmac<Sha512>;

/// Hash algorithms supported for payload signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    /// HMAC-SHA256 (default)
    #[default]
    Sha256,

    /// HMAC-SHA384
    Sha384,

    /// HMAC-SHA512
    Sha512,
}

impl HashAlgorithm {
    /// Every algorithm name accepted by [`HashAlgorithm::from_str`]
    pub const SUPPORTED: [&'static str; 3] = ["sha256", "sha384", "sha512"];

    /// Get the lowercase name of this algorithm
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = WebhookerError;

    /// Parse an algorithm name, rejecting anything outside the supported set
    ///
    /// Rejection happens here, at configuration time, so a bad name never
    /// reaches the signing step.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            other => Err(WebhookerError::InvalidHashAlgorithm {
                value: other.to_string(),
                supported: Self::SUPPORTED.to_vec(),
            }),
        }
    }
}

/// Signing configuration owned by the signed message variant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureConfig {
    /// Algorithm used to compute payload digests
    pub algorithm: HashAlgorithm,

    /// Shared signing key; finalization fails while this is unset
    pub key: Option<String>,
}

/// Compute the hex-encoded HMAC digest of `content` under `key`
///
/// The digest is a pure function of `(algorithm, key, content)` and is
/// computed over the exact wire string, so recipients can verify it against
/// the bytes they receive.
pub fn sign(algorithm: HashAlgorithm, key: &str, content: &str) -> String {
    match algorithm {
        HashAlgorithm::Sha256 => {
            let mut mac =
                HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC can take any size key");
            mac.update(content.as_bytes());
            hex::encode(mac.finalize().into_bytes())
        }
        HashAlgorithm::Sha384 => {
            let mut mac =
                HmacSha384::new_from_slice(key.as_bytes()).expect("HMAC can take any size key");
            mac.update(content.as_bytes());
            hex::encode(mac.finalize().into_bytes())
        }
        HashAlgorithm::Sha512 => {
            let mut mac =
                HmacSha512::new_from_slice(key.as_bytes()).expect("HMAC can take any size key");
            mac.update(content.as_bytes());
            hex::encode(mac.finalize().into_bytes())
        }
    }
}
