//! App - アプリケーション層
//!
//! ports を組み合わせて決済タイムアウトの処理を実装します。
//!
//! # 主要コンポーネント
//! - **SchedulerBuilder**: 協調者のワイヤリングと起動時検証
//! - **SettlementScheduler**: 1 回の発火で行う状態遷移（fire / arm）
//! - **TimerLoop**: InMemoryTimer を定期的に drain して fire を呼ぶループ

pub mod builder;
pub mod scheduler;
pub mod timer_loop;

pub use self::builder::{BuildError, SchedulerBuilder};
pub use self::scheduler::SettlementScheduler;
pub use self::timer_loop::{TimerLoop, TimerLoopHandle};
