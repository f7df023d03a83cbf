//! Errors - エラー型と分類
//!
//! Each port returns its own error enum. The scheduler wraps them in
//! [`SettlementError`] and decides what to do from [`ErrorKind`] alone.
//! Signature extraction has no error type: a missing signature is `None`.

use thiserror::Error;

/// ErrorKind は運用上の分類
///
/// - NotFound: payment / channel が存在しない（その回の試行を中止）
/// - Unavailable: ストレージの一時障害
/// - Signing: 鍵の解決または署名に失敗
/// - Broadcast: 配信失敗（リトライしない）
/// - Rearm: 再アームに失敗（チェーンはここで終わる）
/// - MalformedTask: settlement transaction に入力 0 がない
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Unavailable,
    Signing,
    Broadcast,
    Rearm,
    MalformedTask,
}

/// Failure of a payment / channel lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl LookupError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        LookupError::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    #[error("no signing key for {0}")]
    KeyUnavailable(String),

    #[error("signing input {input_index} failed: {reason}")]
    Failed { input_index: usize, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BroadcastError {
    #[error("network unreachable: {0}")]
    Unreachable(String),

    #[error("transaction {txid} rejected: {reason}")]
    Rejected { txid: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("timer is closed")]
    Closed,

    #[error("timer rejected task: {0}")]
    Rejected(String),
}

/// Everything that can go wrong inside one firing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    #[error("lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("signing failed: {0}")]
    Signing(#[from] SigningError),

    #[error("broadcast failed: {0}")]
    Broadcast(#[from] BroadcastError),

    #[error("re-arm failed, task chain ends here: {0}")]
    Rearm(#[source] TimerError),

    #[error("settlement transaction has no input {0}")]
    MissingInput(usize),
}

impl SettlementError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SettlementError::Lookup(LookupError::NotFound { .. }) => ErrorKind::NotFound,
            SettlementError::Lookup(LookupError::Unavailable(_)) => ErrorKind::Unavailable,
            SettlementError::Signing(_) => ErrorKind::Signing,
            SettlementError::Broadcast(_) => ErrorKind::Broadcast,
            SettlementError::Rearm(_) => ErrorKind::Rearm,
            SettlementError::MissingInput(_) => ErrorKind::MalformedTask,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_wrapped_error() {
        let e: SettlementError = LookupError::not_found("payment", "h1").into();
        assert_eq!(e.kind(), ErrorKind::NotFound);
        assert_eq!(e.to_string(), "lookup failed: payment not found: h1");

        let e: SettlementError = LookupError::Unavailable("db down".into()).into();
        assert_eq!(e.kind(), ErrorKind::Unavailable);

        let e = SettlementError::Rearm(TimerError::Closed);
        assert_eq!(e.kind(), ErrorKind::Rearm);

        let e: SettlementError = BroadcastError::Unreachable("no peers".into()).into();
        assert_eq!(e.kind(), ErrorKind::Broadcast);
    }
}
