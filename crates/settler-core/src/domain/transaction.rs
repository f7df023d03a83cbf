//! Transaction model: the minimal shape of a ledger transaction the scheduler
//! touches. Binary serialization belongs to the ledger protocol and is not
//! modelled here.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::script::Script;

/// Reference to an output of a previous transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    /// Hex-encoded transaction id.
    pub txid: String,
    pub vout: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    pub previous_output: OutPoint,
    pub script_sig: Script,
    pub sequence: u32,
}

impl TxInput {
    pub fn unsigned(previous_output: OutPoint) -> Self {
        Self {
            previous_output,
            script_sig: Script::new(),
            sequence: u32::MAX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub value: u64,
    pub script_pubkey: Script,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub lock_time: u32,
}

impl Transaction {
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Self {
        Self {
            version: 1,
            inputs,
            outputs,
            lock_time: 0,
        }
    }

    pub fn with_lock_time(mut self, lock_time: u32) -> Self {
        self.lock_time = lock_time;
        self
    }

    pub fn input(&self, index: usize) -> Option<&TxInput> {
        self.inputs.get(index)
    }

    pub fn input_mut(&mut self, index: usize) -> Option<&mut TxInput> {
        self.inputs.get_mut(index)
    }

    /// Identifier used in logs: SHA-256 over the JSON form, hex-encoded.
    ///
    /// Stable for identical transactions, which is all logging and
    /// de-duplication in tests need.
    pub fn txid(&self) -> String {
        let encoded = serde_json::to_vec(self).unwrap_or_default();
        hex::encode(Sha256::digest(Sha256::digest(&encoded)))
    }
}

/// A DER-encoded ECDSA signature followed by its sighash-type byte.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature(#[serde(with = "hex")] Vec<u8>);

impl Signature {
    /// Smallest and largest encodings the ledger accepts.
    pub const MIN_LEN: usize = 9;
    pub const MAX_LEN: usize = 73;

    /// Accept `bytes` only if they have the shape of a DER signature plus
    /// sighash byte; anything else is `None`.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let len = bytes.len();
        if !(Self::MIN_LEN..=Self::MAX_LEN).contains(&len) {
            return None;
        }
        // 0x30 <seq len> 0x02 <r len> <r> 0x02 <s len> <s> <sighash>
        if bytes[0] != 0x30 || bytes[1] as usize != len - 3 || bytes[2] != 0x02 {
            return None;
        }
        let r_len = bytes[3] as usize;
        let s_marker = 4 + r_len;
        if r_len == 0 || s_marker + 2 > len - 1 || bytes[s_marker] != 0x02 {
            return None;
        }
        let s_len = bytes[s_marker + 1] as usize;
        if s_len == 0 || s_marker + 2 + s_len != len - 1 {
            return None;
        }
        Some(Self(bytes.to_vec()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn sighash_type(&self) -> u8 {
        self.0[self.0.len() - 1]
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(&self.0))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A well-formed 71-byte signature filled with `fill`.
    pub(crate) fn sample_signature(fill: u8) -> Signature {
        let mut bytes = vec![0x30, 0x44, 0x02, 0x20];
        bytes.extend_from_slice(&[fill; 32]);
        bytes.extend_from_slice(&[0x02, 0x20]);
        bytes.extend_from_slice(&[fill; 32]);
        bytes.push(0x01);
        Signature::from_bytes(&bytes).expect("well-formed sample")
    }

    #[test]
    fn accepts_der_shaped_signature() {
        let sig = sample_signature(0x11);
        assert_eq!(sig.as_bytes().len(), 71);
        assert_eq!(sig.sighash_type(), 0x01);
    }

    #[test]
    fn rejects_wrong_shapes() {
        assert!(Signature::from_bytes(&[]).is_none());
        assert!(Signature::from_bytes(&[0x30; 8]).is_none());
        assert!(Signature::from_bytes(&[0x02; 71]).is_none());

        let mut bad_len = sample_signature(0x11).as_bytes().to_vec();
        bad_len[1] = 0x40;
        assert!(Signature::from_bytes(&bad_len).is_none());

        let mut bad_s = sample_signature(0x11).as_bytes().to_vec();
        bad_s[36] = 0x03;
        assert!(Signature::from_bytes(&bad_s).is_none());
    }

    #[test]
    fn txid_is_stable_and_input_sensitive() {
        let outpoint = OutPoint {
            txid: "00".repeat(32),
            vout: 0,
        };
        let tx = Transaction::new(vec![TxInput::unsigned(outpoint.clone())], vec![]);
        assert_eq!(tx.txid(), tx.clone().txid());

        let other = Transaction::new(
            vec![TxInput::unsigned(OutPoint { vout: 1, ..outpoint })],
            vec![],
        );
        assert_ne!(tx.txid(), other.txid());
    }
}
