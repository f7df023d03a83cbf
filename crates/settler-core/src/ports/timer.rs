//! SettlementTimer port - 遅延実行キュー
//!
//! ホスト側の遅延実行機構（timing wheel など）を表します。プロセス全体の
//! シングルトンではなく注入するので、テストでは FixedClock 付きの
//! InMemoryTimer に差し替えられます。

use std::time::Duration;

use crate::domain::{SettlementTask, TimerError};

/// Arms a task to fire after `delay`.
///
/// The task is moved in; the caller keeps no handle to it, so a scheduled
/// task can never be mutated by its predecessor.
pub trait SettlementTimer: Send + Sync {
    fn schedule_after(&self, delay: Duration, task: SettlementTask) -> Result<(), TimerError>;
}
