//! Channel key material needed to sign and assemble a settlement.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Database identifier of a payment channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelId(u64);

impl ChannelId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "channel-{}", self.0)
    }
}

/// The two public keys that lock the channel's 2-of-2 output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelKeys {
    #[serde(with = "hex")]
    pub server_pubkey: Vec<u8>,
    #[serde(with = "hex")]
    pub client_pubkey: Vec<u8>,
}

/// A payment channel as seen by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub keys: ChannelKeys,
}

impl Channel {
    pub fn new(id: ChannelId, server_pubkey: Vec<u8>, client_pubkey: Vec<u8>) -> Self {
        Self {
            id,
            keys: ChannelKeys {
                server_pubkey,
                client_pubkey,
            },
        }
    }
}

/// This node's private signing key for a channel.
///
/// Opaque to the scheduler: only the [`Signer`](crate::ports::Signer) port
/// looks at the material.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey {
    pub key_id: String,
    material: Vec<u8>,
}

impl SigningKey {
    pub fn new(key_id: impl Into<String>, material: impl Into<Vec<u8>>) -> Self {
        Self {
            key_id: key_id.into(),
            material: material.into(),
        }
    }

    pub fn material(&self) -> &[u8] {
        &self.material
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}
