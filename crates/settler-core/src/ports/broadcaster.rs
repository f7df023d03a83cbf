//! Broadcaster port - ネットワークへの配信

use async_trait::async_trait;

use crate::domain::{BroadcastError, Transaction};

/// Best-effort submission of a finished transaction.
///
/// No confirmation feedback: `Ok(())` only means the submission was handed
/// off. Re-broadcasting an accepted transaction is harmless at the network
/// layer, so callers do not de-duplicate.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn broadcast(&self, transaction: &Transaction) -> Result<(), BroadcastError>;
}
