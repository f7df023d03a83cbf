//! Script - 署名スクリプトの組み立てと読み取り
//!
//! The binary layout follows the base ledger's push-data rules, kept to the
//! subset settlement inputs need:
//! - **assembler**: builds the settlement unlocking script (pure)
//! - **extractor**: reads an existing signature back out of an input

pub mod assembler;
pub mod extractor;

pub use self::assembler::{ScriptAssembler, SignatureSlot, place_signatures};
pub use self::extractor::SignatureExtractor;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opcodes used by settlement scripts.
pub mod opcodes {
    pub const OP_0: u8 = 0x00;
    pub const OP_PUSHDATA1: u8 = 0x4c;
    pub const OP_PUSHDATA2: u8 = 0x4d;
    pub const OP_PUSHDATA4: u8 = 0x4e;
    pub const OP_1: u8 = 0x51;
    pub const OP_2: u8 = 0x52;
    pub const OP_CHECKMULTISIG: u8 = 0xae;
}

use self::opcodes::*;

/// Raw script bytes.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Script(#[serde(with = "hex")] Vec<u8>);

impl Script {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the script's instructions.
    ///
    /// Iteration stops after the first error.
    pub fn instructions(&self) -> Instructions<'_> {
        Instructions {
            data: &self.0,
            done: false,
        }
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", hex::encode(&self.0))
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

/// One decoded script element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction<'a> {
    /// Push data. `OP_0` decodes as an empty push.
    Push(&'a [u8]),
    /// Any non-push opcode.
    Op(u8),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("script ended inside a push-data length prefix")]
    EarlyEndOfScript,

    #[error("push of {expected} bytes runs past end of script ({available} available)")]
    PushPastEnd { expected: usize, available: usize },
}

/// Iterator returned by [`Script::instructions`].
#[derive(Debug, Clone)]
pub struct Instructions<'a> {
    data: &'a [u8],
    done: bool,
}

impl<'a> Instructions<'a> {
    fn take_push(&mut self, header: usize, len: usize) -> Result<Instruction<'a>, ScriptError> {
        let available = self.data.len() - header;
        if available < len {
            return Err(ScriptError::PushPastEnd {
                expected: len,
                available,
            });
        }
        let (push, rest) = self.data[header..].split_at(len);
        self.data = rest;
        Ok(Instruction::Push(push))
    }

    fn length_prefix(&self, width: usize) -> Result<usize, ScriptError> {
        let bytes = self
            .data
            .get(1..1 + width)
            .ok_or(ScriptError::EarlyEndOfScript)?;
        let mut le = [0u8; 4];
        le[..width].copy_from_slice(bytes);
        Ok(u32::from_le_bytes(le) as usize)
    }

    fn step(&mut self) -> Result<Instruction<'a>, ScriptError> {
        let op = self.data[0];
        match op {
            OP_0 => {
                self.data = &self.data[1..];
                Ok(Instruction::Push(&[]))
            }
            0x01..=0x4b => self.take_push(1, op as usize),
            OP_PUSHDATA1 => {
                let len = self.length_prefix(1)?;
                self.take_push(2, len)
            }
            OP_PUSHDATA2 => {
                let len = self.length_prefix(2)?;
                self.take_push(3, len)
            }
            OP_PUSHDATA4 => {
                let len = self.length_prefix(4)?;
                self.take_push(5, len)
            }
            _ => {
                self.data = &self.data[1..];
                Ok(Instruction::Op(op))
            }
        }
    }
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Result<Instruction<'a>, ScriptError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.data.is_empty() {
            return None;
        }
        let item = self.step();
        if item.is_err() {
            self.done = true;
        }
        Some(item)
    }
}

/// Incremental script writer using minimal push encodings.
#[derive(Debug, Clone, Default)]
pub struct ScriptBuilder {
    bytes: Vec<u8>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_opcode(mut self, op: u8) -> Self {
        self.bytes.push(op);
        self
    }

    /// Push data; an empty slice is written as `OP_0`.
    pub fn push_slice(mut self, data: &[u8]) -> Self {
        let len = data.len();
        if len == 0 {
            self.bytes.push(OP_0);
            return self;
        }
        if len < OP_PUSHDATA1 as usize {
            self.bytes.push(len as u8);
        } else if len <= u8::MAX as usize {
            self.bytes.push(OP_PUSHDATA1);
            self.bytes.push(len as u8);
        } else if len <= u16::MAX as usize {
            self.bytes.push(OP_PUSHDATA2);
            self.bytes.extend_from_slice(&(len as u16).to_le_bytes());
        } else {
            self.bytes.push(OP_PUSHDATA4);
            self.bytes.extend_from_slice(&(len as u32).to_le_bytes());
        }
        self.bytes.extend_from_slice(data);
        self
    }

    pub fn push_bool(self, value: bool) -> Self {
        self.push_opcode(if value { OP_1 } else { OP_0 })
    }

    pub fn into_script(self) -> Script {
        Script(self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_uses_minimal_push_encodings() {
        let script = ScriptBuilder::new()
            .push_slice(&[])
            .push_slice(&[0xaa; 3])
            .push_slice(&[0xbb; 80])
            .push_slice(&[0xcc; 300])
            .into_script();
        let bytes = script.as_bytes();

        assert_eq!(bytes[0], OP_0);
        assert_eq!(&bytes[1..5], &[3, 0xaa, 0xaa, 0xaa]);
        assert_eq!(&bytes[5..7], &[OP_PUSHDATA1, 80]);
        assert_eq!(&bytes[87..90], &[OP_PUSHDATA2, 0x2c, 0x01]);
        assert_eq!(bytes.len(), 90 + 300);
    }

    #[test]
    fn instructions_decode_builder_output() {
        let script = ScriptBuilder::new()
            .push_opcode(OP_0)
            .push_slice(b"sig")
            .push_bool(true)
            .push_slice(&[7u8; 100])
            .push_opcode(OP_CHECKMULTISIG)
            .into_script();

        let decoded: Vec<_> = script.instructions().collect::<Result<_, _>>().unwrap();
        assert_eq!(
            decoded,
            vec![
                Instruction::Push(&[]),
                Instruction::Push(b"sig"),
                Instruction::Op(OP_1),
                Instruction::Push(&[7u8; 100]),
                Instruction::Op(OP_CHECKMULTISIG),
            ]
        );
    }

    #[test]
    fn truncated_push_is_an_error_and_stops_iteration() {
        let script = Script::from_bytes(vec![0x05, 0x01, 0x02]);
        let mut it = script.instructions();
        assert_eq!(
            it.next(),
            Some(Err(ScriptError::PushPastEnd {
                expected: 5,
                available: 2
            }))
        );
        assert_eq!(it.next(), None);
    }

    #[test]
    fn truncated_length_prefix_is_an_error() {
        let script = Script::from_bytes(vec![OP_PUSHDATA2, 0x01]);
        assert_eq!(
            script.instructions().next(),
            Some(Err(ScriptError::EarlyEndOfScript))
        );
    }
}
