//! Payment model: a hashed payment whose secret may or may not be revealed yet.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::channel::ChannelId;

/// Hex-encoded hash gating a payment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecretHash(String);

impl SecretHash {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// SHA-256 of the secret, hex-encoded.
    pub fn of(secret: &Secret) -> Self {
        Self(hex::encode(Sha256::digest(secret.as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The preimage of a [`SecretHash`].
///
/// Debug output is redacted; the secret only ever leaves this type as raw
/// bytes pushed into an unlocking script.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret(#[serde(with = "hex")] Vec<u8>);

impl Secret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(<{} bytes>)", self.0.len())
    }
}

/// A hashed payment as stored by the channel database.
///
/// Read-only from the scheduler's point of view: `secret` is filled in by
/// whichever component learns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub secret_hash: SecretHash,
    pub channel_id: ChannelId,
    pub secret: Option<Secret>,
    /// Direction of the hashed payment (`true`: towards the server).
    pub payment_to_server: bool,
}

impl Payment {
    pub fn new(secret_hash: SecretHash, channel_id: ChannelId, payment_to_server: bool) -> Self {
        Self {
            secret_hash,
            channel_id,
            secret: None,
            payment_to_server,
        }
    }

    pub fn with_secret(mut self, secret: Secret) -> Self {
        self.secret = Some(secret);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_hash_is_sha256_hex() {
        let hash = SecretHash::of(&Secret::new(b"abc".to_vec()));
        assert_eq!(
            hash.as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn secret_debug_is_redacted() {
        let secret = Secret::new(vec![0xde, 0xad]);
        assert_eq!(format!("{secret:?}"), "Secret(<2 bytes>)");
    }

    #[test]
    fn new_payment_is_unrevealed() {
        let p = Payment::new(SecretHash::new("h1"), ChannelId::new(7), true);
        assert!(p.secret.is_none());
        assert_eq!(
            p.with_secret(Secret::new(vec![1])).secret,
            Some(Secret::new(vec![1]))
        );
    }
}
