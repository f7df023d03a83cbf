//! Domain model (ids, tasks, payments, channels, transactions, outcomes, ...).

pub mod channel;
pub mod decision;
pub mod errors;
pub mod ids;
pub mod outcome;
pub mod payment;
pub mod role;
pub mod state;
pub mod task;
pub mod transaction;

pub use self::channel::{Channel, ChannelId, ChannelKeys, SigningKey};
pub use self::decision::{ClaimDecision, authorize};
pub use self::errors::{
    BroadcastError, ErrorKind, LookupError, SettlementError, SigningError, TimerError,
};
pub use self::ids::{AttemptId, TaskId};
pub use self::outcome::{BroadcastKind, BroadcastRecord, FiringReport};
pub use self::payment::{Payment, Secret, SecretHash};
pub use self::role::NodeRole;
pub use self::state::SettlementState;
pub use self::task::{SecretGate, SettlementTask};
pub use self::transaction::{OutPoint, Signature, Transaction, TxInput, TxOutput};
