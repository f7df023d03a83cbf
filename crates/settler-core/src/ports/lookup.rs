//! Lookup ports - payment / channel / key の参照
//!
//! 永続化はこのクレートの外側にあります。scheduler は読み取りのみ行い、
//! 同じ行への同時アクセスの制御は各ストア実装の責務です。

use async_trait::async_trait;

use crate::domain::{Channel, ChannelId, LookupError, Payment, SecretHash, SigningError, SigningKey};

/// Resolves a hashed payment and its current secret-reveal status.
#[async_trait]
pub trait PaymentLookup: Send + Sync {
    /// `LookupError::NotFound` when no payment matches the pair.
    async fn lookup_payment(
        &self,
        secret_hash: &SecretHash,
        channel_id: ChannelId,
    ) -> Result<Payment, LookupError>;
}

/// Resolves channel key material.
#[async_trait]
pub trait ChannelLookup: Send + Sync {
    async fn lookup_channel(&self, channel_id: ChannelId) -> Result<Channel, LookupError>;
}

/// Resolves this node's active signing key for a channel.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    async fn current_signing_key(&self, channel: &Channel) -> Result<SigningKey, SigningError>;
}
