//! TimerLoop - InMemoryTimer から期限切れのタスクを取り出して発火させるループ
//!
//! # 設計
//! - tick ごとに pop_due() → scheduler.fire() を順番に実行
//! - 1 つのタスクの失敗は他のタスクに影響しない（fire は失敗を返さない）
//! - shutdown は watch channel で通知（WorkerGroup と同じ方式）
//! - FiringReport は容量 REPORT_BUFFER の channel に流す。読まれずに満杯なら捨てる
//! - 実行中の fire は中断しない。次の tick を取らないだけ

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::domain::FiringReport;
use crate::impls::InMemoryTimer;

use super::scheduler::SettlementScheduler;

/// Reports buffered for [`TimerLoopHandle::reports`] before new ones are dropped.
pub const REPORT_BUFFER: usize = 64;

pub struct TimerLoop {
    timer: Arc<InMemoryTimer>,
    scheduler: Arc<SettlementScheduler>,
}

impl TimerLoop {
    pub fn new(timer: Arc<InMemoryTimer>, scheduler: Arc<SettlementScheduler>) -> Self {
        Self { timer, scheduler }
    }

    /// Fire every task that is due now, earliest first.
    pub async fn run_due(&self) -> Vec<FiringReport> {
        let due = self.timer.pop_due();
        if !due.is_empty() {
            debug!(count = due.len(), "firing due settlement tasks");
        }
        let mut reports = Vec::with_capacity(due.len());
        for task in &due {
            reports.push(self.scheduler.fire(task).await);
        }
        reports
    }

    /// Run on a tokio interval until the handle is shut down.
    pub fn spawn(self, tick: Duration) -> TimerLoopHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let (report_tx, report_rx) = mpsc::channel(REPORT_BUFFER);

        let join = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(tick_millis = tick.as_millis() as u64, "timer loop started");

            loop {
                if *shutdown_rx.borrow() {
                    break;
                }
                tokio::select! {
                    changed = shutdown_rx.changed() => {
                        // sender dropped counts as shutdown
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = interval.tick() => {
                        for report in self.run_due().await {
                            match report_tx.try_send(report) {
                                Ok(()) => {}
                                Err(TrySendError::Full(report)) => {
                                    debug!(task_id = %report.task_id, "report buffer full; dropping report");
                                }
                                // nobody listens; reports are informational
                                Err(TrySendError::Closed(_)) => {}
                            }
                        }
                    }
                }
            }
            info!("timer loop stopped");
        });

        TimerLoopHandle {
            shutdown_tx,
            join,
            reports: report_rx,
        }
    }
}

/// Handle to a spawned [`TimerLoop`].
/// - `shutdown_and_join()` でループの終了を待てる
/// - `reports()` で発火ごとの FiringReport を受け取れる（最大 REPORT_BUFFER 件まで保持）
pub struct TimerLoopHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
    reports: mpsc::Receiver<FiringReport>,
}

impl TimerLoopHandle {
    pub fn reports(&mut self) -> &mut mpsc::Receiver<FiringReport> {
        &mut self.reports
    }

    pub fn request_shutdown(&self) {
        // ignore send error: the loop may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        let _ = self.join.await;
    }
}
