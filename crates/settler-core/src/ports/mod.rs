//! Ports - 抽象化レイヤー
//!
//! scheduler が外部に依存する部分をすべて trait として定義します。
//! 実装の詳細（DB、鍵管理、P2P ネットワーク、タイマー）は隠蔽されます。
//!
//! # 設計原則
//! - scheduler はポートを呼ぶだけで、スレッドを持たない
//! - 失敗はすべて明示的な Result で返す（例外による制御フローはしない）

pub mod broadcaster;
pub mod clock;
pub mod id_generator;
pub mod lookup;
pub mod signer;
pub mod timer;

pub use self::broadcaster::Broadcaster;
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::lookup::{ChannelLookup, KeyResolver, PaymentLookup};
pub use self::signer::Signer;
pub use self::timer::SettlementTimer;
