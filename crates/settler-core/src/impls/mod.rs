//! Impls - ポートの実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **InMemoryStore**: payment / channel / key の参照
//! - **InMemoryTimer**: FixedClock で駆動できる遅延実行キュー
//! - **RecordingBroadcaster**: 配信内容を記録するだけの Broadcaster
//! - **DigestSigner**: 決定的な開発用 Signer（本物の ECDSA ではない）
//!
//! 本番用の実装（DB、鍵管理、P2P 配信）は別クレートに配置します。

pub mod digest_signer;
pub mod inmem_store;
pub mod inmem_timer;
pub mod recording_broadcaster;

pub use self::digest_signer::DigestSigner;
pub use self::inmem_store::InMemoryStore;
pub use self::inmem_timer::InMemoryTimer;
pub use self::recording_broadcaster::RecordingBroadcaster;
