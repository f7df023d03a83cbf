//! DigestSigner - 開発用の決定的な Signer
//!
//! 本物の ECDSA ではありません。SHA-256 から DER 形式の署名バイト列を作るだけで、
//! ledger 上では検証できません。scheduler の配線とテスト用です。

use async_trait::async_trait;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::domain::{Signature, SigningError, SigningKey, Transaction, TxOutput};
use crate::ports::Signer;

/// SIGHASH_ALL
const SIGHASH_ALL: u8 = 0x01;

/// What gets hashed: the transaction with every input script blanked, the
/// input being signed, and the output it spends.
#[derive(Serialize)]
struct SigningPayload<'a> {
    transaction: &'a Transaction,
    input_index: usize,
    spent_output: &'a TxOutput,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DigestSigner;

impl DigestSigner {
    pub fn new() -> Self {
        Self
    }

    fn digest(
        transaction: &Transaction,
        input_index: usize,
        spent_output: &TxOutput,
    ) -> Result<[u8; 32], SigningError> {
        let mut blanked = transaction.clone();
        for input in &mut blanked.inputs {
            input.script_sig = Default::default();
        }
        let payload = SigningPayload {
            transaction: &blanked,
            input_index,
            spent_output,
        };
        let encoded = serde_json::to_vec(&payload).map_err(|e| SigningError::Failed {
            input_index,
            reason: e.to_string(),
        })?;
        Ok(Sha256::digest(Sha256::digest(&encoded)).into())
    }
}

#[async_trait]
impl Signer for DigestSigner {
    async fn sign(
        &self,
        transaction: &Transaction,
        input_index: usize,
        spent_output: &TxOutput,
        key: &SigningKey,
    ) -> Result<Signature, SigningError> {
        if transaction.input(input_index).is_none() {
            return Err(SigningError::Failed {
                input_index,
                reason: "no such input".to_string(),
            });
        }
        let digest = Self::digest(transaction, input_index, spent_output)?;
        let r = Sha256::new()
            .chain_update(key.material())
            .chain_update(digest)
            .finalize();
        let s = Sha256::new().chain_update(r).chain_update(digest).finalize();

        let mut der = Vec::with_capacity(71);
        der.extend_from_slice(&[0x30, 0x44, 0x02, 0x20]);
        der.extend_from_slice(&r);
        der.extend_from_slice(&[0x02, 0x20]);
        der.extend_from_slice(&s);
        der.push(SIGHASH_ALL);

        Signature::from_bytes(&der).ok_or(SigningError::Failed {
            input_index,
            reason: "produced malformed signature".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OutPoint, TxInput};
    use crate::script::Script;

    fn tx() -> Transaction {
        Transaction::new(
            vec![TxInput::unsigned(OutPoint {
                txid: "ef".repeat(32),
                vout: 1,
            })],
            vec![TxOutput {
                value: 5_000,
                script_pubkey: Script::from_bytes(vec![0x51]),
            }],
        )
    }

    fn output() -> TxOutput {
        TxOutput {
            value: 10_000,
            script_pubkey: Script::new(),
        }
    }

    #[tokio::test]
    async fn signing_is_deterministic_and_ignores_existing_script_sig() {
        let signer = DigestSigner::new();
        let key = SigningKey::new("k", vec![1; 32]);

        let a = signer.sign(&tx(), 0, &output(), &key).await.unwrap();
        let mut presigned = tx();
        presigned.inputs[0].script_sig = Script::from_bytes(vec![0x00, 0x01, 0xff]);
        let b = signer.sign(&presigned, 0, &output(), &key).await.unwrap();

        assert_eq!(a, b);
        assert_eq!(a.sighash_type(), SIGHASH_ALL);
    }

    #[tokio::test]
    async fn different_keys_give_different_signatures() {
        let signer = DigestSigner::new();
        let a = signer
            .sign(&tx(), 0, &output(), &SigningKey::new("a", vec![1; 32]))
            .await
            .unwrap();
        let b = signer
            .sign(&tx(), 0, &output(), &SigningKey::new("b", vec![2; 32]))
            .await
            .unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn missing_input_is_a_signing_failure() {
        let err = DigestSigner::new()
            .sign(&tx(), 3, &output(), &SigningKey::new("k", vec![1; 32]))
            .await
            .unwrap_err();
        assert!(matches!(err, SigningError::Failed { input_index: 3, .. }));
    }
}
