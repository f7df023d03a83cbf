//! State - 決済タスクの状態
//!
//! # 状態遷移
//! - no_secret_gate: secret_hash なし → fallback を無条件に配信して終了
//! - check_secret: secret_hash あり → Payment を参照
//! - not_yet_revealed: secret 未公開 → 再アームして終了
//! - revealed_authorized: secret 公開済み・請求権あり → settlement を配信
//! - revealed_unauthorized: secret 公開済み・請求権なし → 何もせず終了
//! - aborted: Payment が見つからない → 何もせず終了（再アームもしない）

use serde::{Deserialize, Serialize};

/// Where a firing of a [`SettlementTask`](super::SettlementTask) ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettlementState {
    CheckSecret,
    NotYetRevealed,
    RevealedAuthorized,
    RevealedUnauthorized,
    NoSecretGate,
    Aborted,
}

impl SettlementState {
    /// Entry state for a task, decided only by whether it carries a secret hash.
    pub fn entry(secret_gated: bool) -> Self {
        if secret_gated {
            SettlementState::CheckSecret
        } else {
            SettlementState::NoSecretGate
        }
    }

    /// Whether the task's chain continues after this state.
    pub fn rearms(self) -> bool {
        matches!(self, SettlementState::NotYetRevealed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_depends_on_gate() {
        assert_eq!(SettlementState::entry(true), SettlementState::CheckSecret);
        assert_eq!(SettlementState::entry(false), SettlementState::NoSecretGate);
    }

    #[test]
    fn only_not_yet_revealed_rearms() {
        assert!(SettlementState::NotYetRevealed.rearms());
        assert!(!SettlementState::NoSecretGate.rearms());
        assert!(!SettlementState::RevealedUnauthorized.rearms());
        assert!(!SettlementState::Aborted.rearms());
    }

    #[test]
    fn serializes_as_screaming_snake_case() {
        let s = serde_json::to_string(&SettlementState::RevealedUnauthorized).unwrap();
        assert_eq!(s, "\"REVEALED_UNAUTHORIZED\"");
    }
}
