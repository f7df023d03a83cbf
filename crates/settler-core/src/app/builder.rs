//! SchedulerBuilder - スケジューラの構築とワイヤリング
//!
//! # Fail-fast 設計
//! - 必須の協調者（payments, channels, keys, signer, broadcaster, timer）が
//!   揃っていなければ build() 時に BuildError を返す
//! - 実行中に「配線漏れ」で失敗することはない
//! - id_generator だけは省略可能（SystemClock ベースの ULID になる）

use std::sync::Arc;

use crate::config::SchedulerConfig;
use crate::impls::InMemoryStore;
use crate::ports::{
    Broadcaster, ChannelLookup, IdGenerator, KeyResolver, PaymentLookup, SettlementTimer, Signer,
    SystemClock, UlidGenerator,
};

use super::scheduler::{Collaborators, SettlementScheduler};

/// BuildError はスケジューラ構築時のエラー
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("missing collaborator `{0}`; wire it before calling build()")]
    MissingCollaborator(&'static str),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// # 使用例
/// ```ignore
/// let scheduler = SchedulerBuilder::new(config)
///     .store(store.clone())
///     .signer(Arc::new(DigestSigner::new()))
///     .broadcaster(broadcaster)
///     .timer(timer)
///     .build()?;
/// ```
pub struct SchedulerBuilder {
    config: SchedulerConfig,
    payments: Option<Arc<dyn PaymentLookup>>,
    channels: Option<Arc<dyn ChannelLookup>>,
    keys: Option<Arc<dyn KeyResolver>>,
    signer: Option<Arc<dyn Signer>>,
    broadcaster: Option<Arc<dyn Broadcaster>>,
    timer: Option<Arc<dyn SettlementTimer>>,
    ids: Option<Arc<dyn IdGenerator>>,
}

impl SchedulerBuilder {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            payments: None,
            channels: None,
            keys: None,
            signer: None,
            broadcaster: None,
            timer: None,
            ids: None,
        }
    }

    pub fn payments(mut self, payments: Arc<dyn PaymentLookup>) -> Self {
        self.payments = Some(payments);
        self
    }

    pub fn channels(mut self, channels: Arc<dyn ChannelLookup>) -> Self {
        self.channels = Some(channels);
        self
    }

    pub fn keys(mut self, keys: Arc<dyn KeyResolver>) -> Self {
        self.keys = Some(keys);
        self
    }

    /// Use one in-memory store for payment, channel and key lookups.
    pub fn store(self, store: Arc<InMemoryStore>) -> Self {
        self.payments(store.clone())
            .channels(store.clone())
            .keys(store)
    }

    pub fn signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn broadcaster(mut self, broadcaster: Arc<dyn Broadcaster>) -> Self {
        self.broadcaster = Some(broadcaster);
        self
    }

    pub fn timer(mut self, timer: Arc<dyn SettlementTimer>) -> Self {
        self.timer = Some(timer);
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// # 検証
    /// - config.validate() が通ること
    /// - 必須の協調者が全て設定されていること（最初に見つかった不足を返す）
    pub fn build(self) -> Result<SettlementScheduler, BuildError> {
        self.config
            .validate()
            .map_err(|e| BuildError::InvalidConfig(e.to_string()))?;

        let parts = Collaborators {
            payments: self.payments.ok_or(BuildError::MissingCollaborator("payments"))?,
            channels: self.channels.ok_or(BuildError::MissingCollaborator("channels"))?,
            keys: self.keys.ok_or(BuildError::MissingCollaborator("keys"))?,
            signer: self.signer.ok_or(BuildError::MissingCollaborator("signer"))?,
            broadcaster: self
                .broadcaster
                .ok_or(BuildError::MissingCollaborator("broadcaster"))?,
            timer: self.timer.ok_or(BuildError::MissingCollaborator("timer"))?,
            ids: self
                .ids
                .unwrap_or_else(|| Arc::new(UlidGenerator::new(SystemClock))),
        };
        Ok(SettlementScheduler::new(self.config, parts))
    }
}
