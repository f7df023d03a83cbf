//! Outcome model: what a single firing did.
//!
//! The scheduler never returns an error to the timer loop. Instead every
//! firing produces a [`FiringReport`] that records the final state, the
//! broadcasts attempted, the re-arm (if any), and the errors it swallowed.

use serde::Serialize;

use super::errors::{BroadcastError, ErrorKind, SettlementError};
use super::ids::{AttemptId, TaskId};
use super::state::SettlementState;
use crate::script::Script;

/// Which of the task's transactions was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadcastKind {
    Settlement,
    Fallback,
}

/// One call to the broadcaster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastRecord {
    pub kind: BroadcastKind,
    pub txid: String,
    pub error: Option<BroadcastError>,
}

impl BroadcastRecord {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct FiringReport {
    pub task_id: TaskId,
    pub attempt_id: AttemptId,
    /// The task's attempt number (1 for the first arming).
    pub attempt: u32,
    pub state: SettlementState,
    pub broadcasts: Vec<BroadcastRecord>,
    /// Id of the follow-up task, when this firing re-armed.
    pub rearmed_as: Option<TaskId>,
    /// Unlocking script attached to the settlement input, when one was built.
    pub settlement_script: Option<Script>,
    pub errors: Vec<SettlementError>,
}

impl FiringReport {
    pub fn new(task_id: TaskId, attempt_id: AttemptId, attempt: u32, state: SettlementState) -> Self {
        Self {
            task_id,
            attempt_id,
            attempt,
            state,
            broadcasts: Vec::new(),
            rearmed_as: None,
            settlement_script: None,
            errors: Vec::new(),
        }
    }

    pub fn broadcasts_of(&self, kind: BroadcastKind) -> usize {
        self.broadcasts.iter().filter(|b| b.kind == kind).count()
    }

    pub fn has_error(&self, kind: ErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind() == kind)
    }
}
