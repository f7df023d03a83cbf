//! Signer port - 署名アルゴリズムの抽象化

use async_trait::async_trait;

use crate::domain::{Signature, SigningError, SigningKey, Transaction, TxOutput};

/// Signs one input of a transaction against the output it spends.
///
/// Implementations may be deterministic or randomized; a failure ends the
/// claim for the current firing.
#[async_trait]
pub trait Signer: Send + Sync {
    async fn sign(
        &self,
        transaction: &Transaction,
        input_index: usize,
        spent_output: &TxOutput,
        key: &SigningKey,
    ) -> Result<Signature, SigningError>;
}
