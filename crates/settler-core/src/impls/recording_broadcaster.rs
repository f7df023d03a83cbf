//! RecordingBroadcaster - 配信内容を記録する開発用 Broadcaster
//!
//! ネットワークには何も送らず、受け取った transaction を順番に保持します。
//! `fail_next` / `fail_always` で配信失敗を再現できます。

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::info;

use crate::domain::{BroadcastError, Transaction};
use crate::ports::Broadcaster;

#[derive(Default)]
struct Recorded {
    sent: Vec<Transaction>,
    queued_failures: VecDeque<BroadcastError>,
    permanent_failure: Option<BroadcastError>,
}

#[derive(Default)]
pub struct RecordingBroadcaster {
    inner: Mutex<Recorded>,
}

impl RecordingBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Transactions accepted so far, in submission order.
    pub fn sent(&self) -> Vec<Transaction> {
        self.lock().sent.clone()
    }

    pub fn sent_count(&self) -> usize {
        self.lock().sent.len()
    }

    /// Fail the next call with `error`; later calls behave normally.
    pub fn fail_next(&self, error: BroadcastError) {
        self.lock().queued_failures.push_back(error);
    }

    /// Fail every call with `error` (`None` restores normal behaviour).
    pub fn fail_always(&self, error: Option<BroadcastError>) {
        self.lock().permanent_failure = error;
    }
}

#[async_trait]
impl Broadcaster for RecordingBroadcaster {
    async fn broadcast(&self, transaction: &Transaction) -> Result<(), BroadcastError> {
        let mut inner = self.lock();
        if let Some(error) = inner.queued_failures.pop_front() {
            return Err(error);
        }
        if let Some(error) = &inner.permanent_failure {
            return Err(error.clone());
        }
        info!(txid = %transaction.txid(), "recorded broadcast");
        inner.sent.push(transaction.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_in_order_and_injects_failures() {
        let broadcaster = RecordingBroadcaster::new();
        let tx1 = Transaction::new(vec![], vec![]);
        let tx2 = Transaction::new(vec![], vec![]).with_lock_time(500);

        broadcaster.fail_next(BroadcastError::Unreachable("no peers".into()));
        assert!(broadcaster.broadcast(&tx1).await.is_err());
        broadcaster.broadcast(&tx1).await.unwrap();
        broadcaster.broadcast(&tx2).await.unwrap();
        assert_eq!(broadcaster.sent(), vec![tx1.clone(), tx2]);

        broadcaster.fail_always(Some(BroadcastError::Unreachable("offline".into())));
        assert!(broadcaster.broadcast(&tx1).await.is_err());
        assert_eq!(broadcaster.sent_count(), 2);
    }
}
