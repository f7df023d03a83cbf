//! settler-core
//!
//! Settlement timeouts for payment channels. When a channel's timer fires, the
//! scheduler either broadcasts the pre-signed refund, or waits for a payment
//! secret and claims the payment with a settlement transaction once the secret
//! is known.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, role, payment, channel, transaction, task, state, decision, errors, outcome）
//! - **script**: 解錠スクリプトの組み立て（ScriptAssembler）と署名の取り出し（SignatureExtractor）
//! - **ports**: 抽象化レイヤー（PaymentLookup, ChannelLookup, KeyResolver, Signer, Broadcaster, SettlementTimer, Clock, IdGenerator）
//! - **app**: アプリケーションロジック（SchedulerBuilder, SettlementScheduler, TimerLoop）
//! - **impls**: 実装（InMemoryStore, InMemoryTimer など開発用）
//! - **config**: SchedulerConfig（TOML / 環境変数）
//! - **observability**: SettlementCounts

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod observability;
pub mod ports;
pub mod script;
