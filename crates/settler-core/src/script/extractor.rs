//! SignatureExtractor: reads a counterparty signature back out of an input.
//!
//! The first time a settlement task fires the input is usually unsigned, so
//! "no signature" is the normal answer and is returned as `None`.

use super::{Instruction, SignatureSlot};
use crate::domain::{Signature, TxInput};

#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureExtractor;

impl SignatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// The first well-formed signature anywhere in the input script.
    pub fn extract(&self, input: &TxInput) -> Option<Signature> {
        self.pushes(input)?
            .into_iter()
            .skip(1)
            .find_map(Signature::from_bytes)
    }

    /// The signature in a specific canonical slot, if that slot is filled.
    pub fn extract_slot(&self, input: &TxInput, slot: SignatureSlot) -> Option<Signature> {
        let pushes = self.pushes(input)?;
        Signature::from_bytes(pushes.get(slot.index())?)
    }

    /// Push elements of a multisig-style script (leading dummy required).
    /// `None` for empty, truncated, or non-multisig scripts.
    fn pushes<'a>(&self, input: &'a TxInput) -> Option<Vec<&'a [u8]>> {
        let mut pushes = Vec::new();
        for instruction in input.script_sig.instructions() {
            match instruction.ok()? {
                Instruction::Push(data) => pushes.push(data),
                Instruction::Op(_) => pushes.push(&[]),
            }
        }
        match pushes.first() {
            Some(dummy) if dummy.is_empty() => Some(pushes),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::tests::sample_signature;
    use crate::domain::{ChannelKeys, OutPoint};
    use crate::script::{Script, ScriptAssembler, ScriptBuilder};
    use rstest::rstest;

    fn input_with(script: Script) -> TxInput {
        let mut input = TxInput::unsigned(OutPoint {
            txid: "cd".repeat(32),
            vout: 0,
        });
        input.script_sig = script;
        input
    }

    fn keys() -> ChannelKeys {
        ChannelKeys {
            server_pubkey: vec![0x02; 33],
            client_pubkey: vec![0x03; 33],
        }
    }

    #[test]
    fn unsigned_input_is_absent_every_time() {
        let extractor = SignatureExtractor::new();
        let input = input_with(Script::new());
        for _ in 0..3 {
            assert_eq!(extractor.extract(&input), None);
            assert_eq!(extractor.extract_slot(&input, SignatureSlot::Server), None);
        }
    }

    #[rstest]
    #[case::truncated_push(vec![0x00, 0x47, 0x30, 0x44])]
    #[case::truncated_pushdata1(vec![0x00, 0x4c])]
    #[case::no_dummy(vec![0x03, 0x01, 0x02, 0x03])]
    #[case::garbage_push(vec![0x00, 0x03, 0xde, 0xad, 0xbe])]
    #[case::only_opcodes(vec![0x00, 0xae, 0xae])]
    fn malformed_input_is_absent(#[case] bytes: Vec<u8>) {
        let input = input_with(Script::from_bytes(bytes));
        assert_eq!(SignatureExtractor::new().extract(&input), None);
    }

    #[test]
    fn reads_signature_from_its_slot() {
        let client = sample_signature(0xbb);
        let script = ScriptAssembler::new().settlement_script_sig(
            &keys(),
            None,
            Some(&client),
            None,
            false,
            false,
        );
        let input = input_with(script);
        let extractor = SignatureExtractor::new();

        assert_eq!(extractor.extract_slot(&input, SignatureSlot::Server), None);
        assert_eq!(
            extractor.extract_slot(&input, SignatureSlot::Client),
            Some(client.clone())
        );
        assert_eq!(extractor.extract(&input), Some(client));
    }

    #[test]
    fn plain_multisig_input_is_readable() {
        let sig = sample_signature(0x42);
        let input = input_with(
            ScriptBuilder::new()
                .push_slice(&[])
                .push_slice(sig.as_bytes())
                .into_script(),
        );
        assert_eq!(SignatureExtractor::new().extract(&input), Some(sig));
    }
}
