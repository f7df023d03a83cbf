//! SettlementTask: one unit of scheduled settlement work.

use serde::{Deserialize, Serialize};

use super::channel::ChannelId;
use super::ids::TaskId;
use super::payment::SecretHash;
use super::role::NodeRole;
use super::transaction::{Transaction, TxOutput};

/// The secret-gated half of a task: present only for hashed payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretGate {
    pub secret_hash: SecretHash,
    /// Claims `claimable_output` once the secret is known. Carries no lock time.
    pub settlement_transaction: Transaction,
    /// Which party's key set produced this settlement branch.
    pub server_issued: bool,
    pub claimable_output: TxOutput,
}

/// Immutable description of a scheduled settlement attempt.
///
/// Design:
/// - Never mutated after construction; a retry is a new value from
///   [`SettlementTask::rearmed`] with a fresh id.
/// - `gate == None` is the unconditional (refund) mode and never re-arms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementTask {
    id: TaskId,
    attempt: u32,
    channel_id: ChannelId,
    created_by: NodeRole,
    fallback_transaction: Transaction,
    gate: Option<SecretGate>,
}

impl SettlementTask {
    /// A task that just broadcasts `fallback_transaction` when it fires.
    pub fn unconditional(
        id: TaskId,
        channel_id: ChannelId,
        created_by: NodeRole,
        fallback_transaction: Transaction,
    ) -> Self {
        Self {
            id,
            attempt: 1,
            channel_id,
            created_by,
            fallback_transaction,
            gate: None,
        }
    }

    /// A task that waits for the payment's secret before claiming.
    pub fn secret_gated(
        id: TaskId,
        channel_id: ChannelId,
        created_by: NodeRole,
        fallback_transaction: Transaction,
        gate: SecretGate,
    ) -> Self {
        Self {
            id,
            attempt: 1,
            channel_id,
            created_by,
            fallback_transaction,
            gate: Some(gate),
        }
    }

    /// Copy of this task for the next check, under a new id.
    pub fn rearmed(&self, id: TaskId) -> Self {
        Self {
            id,
            attempt: self.attempt.saturating_add(1),
            ..self.clone()
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// 1 for the first arming, incremented on every re-arm.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    pub fn created_by(&self) -> NodeRole {
        self.created_by
    }

    pub fn fallback_transaction(&self) -> &Transaction {
        &self.fallback_transaction
    }

    pub fn gate(&self) -> Option<&SecretGate> {
        self.gate.as_ref()
    }

    pub fn is_secret_gated(&self) -> bool {
        self.gate.is_some()
    }
}
