//! InMemoryStore - 開発用の payment / channel / key ストア
//!
//! # 実装詳細
//! - tokio の RwLock で排他制御（同じ payment 行への読み書きを直列化）
//! - PaymentLookup / ChannelLookup / KeyResolver を 1 つの型で実装

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{
    Channel, ChannelId, LookupError, Payment, Secret, SecretHash, SigningError, SigningKey,
};
use crate::ports::{ChannelLookup, KeyResolver, PaymentLookup};

#[derive(Default)]
struct StoreState {
    payments: HashMap<(SecretHash, ChannelId), Payment>,
    channels: HashMap<ChannelId, Channel>,
    keys: HashMap<ChannelId, SigningKey>,
    /// When set, every lookup fails with `Unavailable` (outage simulation).
    outage: Option<String>,
}

/// In-memory stand-in for the channel database.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_payment(&self, payment: Payment) {
        let mut state = self.state.write().await;
        let key = (payment.secret_hash.clone(), payment.channel_id);
        state.payments.insert(key, payment);
    }

    /// Record the secret for a payment. Returns `false` if no such payment exists.
    pub async fn reveal_secret(
        &self,
        secret_hash: &SecretHash,
        channel_id: ChannelId,
        secret: Secret,
    ) -> bool {
        let mut state = self.state.write().await;
        match state.payments.get_mut(&(secret_hash.clone(), channel_id)) {
            Some(payment) => {
                payment.secret = Some(secret);
                true
            }
            None => false,
        }
    }

    pub async fn remove_payment(&self, secret_hash: &SecretHash, channel_id: ChannelId) {
        let mut state = self.state.write().await;
        state.payments.remove(&(secret_hash.clone(), channel_id));
    }

    pub async fn insert_channel(&self, channel: Channel) {
        let mut state = self.state.write().await;
        state.channels.insert(channel.id, channel);
    }

    pub async fn set_signing_key(&self, channel_id: ChannelId, key: SigningKey) {
        let mut state = self.state.write().await;
        state.keys.insert(channel_id, key);
    }

    /// Make every lookup fail with `Unavailable` until `None` is passed.
    pub async fn set_outage(&self, reason: Option<String>) {
        self.state.write().await.outage = reason;
    }
}

fn check_outage(state: &StoreState) -> Result<(), LookupError> {
    match &state.outage {
        Some(reason) => Err(LookupError::Unavailable(reason.clone())),
        None => Ok(()),
    }
}

#[async_trait]
impl PaymentLookup for InMemoryStore {
    async fn lookup_payment(
        &self,
        secret_hash: &SecretHash,
        channel_id: ChannelId,
    ) -> Result<Payment, LookupError> {
        let state = self.state.read().await;
        check_outage(&state)?;
        state
            .payments
            .get(&(secret_hash.clone(), channel_id))
            .cloned()
            .ok_or_else(|| LookupError::not_found("payment", format!("{secret_hash}@{channel_id}")))
    }
}

#[async_trait]
impl ChannelLookup for InMemoryStore {
    async fn lookup_channel(&self, channel_id: ChannelId) -> Result<Channel, LookupError> {
        let state = self.state.read().await;
        check_outage(&state)?;
        state
            .channels
            .get(&channel_id)
            .cloned()
            .ok_or_else(|| LookupError::not_found("channel", channel_id))
    }
}

#[async_trait]
impl KeyResolver for InMemoryStore {
    async fn current_signing_key(&self, channel: &Channel) -> Result<SigningKey, SigningError> {
        let state = self.state.read().await;
        state
            .keys
            .get(&channel.id)
            .cloned()
            .ok_or_else(|| SigningError::KeyUnavailable(channel.id.to_string()))
    }
}
