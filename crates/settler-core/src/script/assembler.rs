//! ScriptAssembler: builds the unlocking script for a settlement input.
//!
//! Layout (both sides must produce exactly this):
//!
//! ```text
//! OP_0                  multisig dummy element
//! <server sig | OP_0>   slot 1
//! <client sig | OP_0>   slot 2
//! <secret>              only when a secret is given
//! <OP_1 | OP_0>         payment_to_server selector
//! <OP_1 | OP_0>         server_issued selector
//! <redeem script>       OP_2 <server key> <client key> OP_2 OP_CHECKMULTISIG
//! ```
//!
//! A missing signature is written as `OP_0` so the slots never shift. Getting
//! the slot order wrong is not detected here; the ledger rejects the script.

use super::opcodes::{OP_0, OP_2, OP_CHECKMULTISIG};
use super::{Script, ScriptBuilder};
use crate::domain::{ChannelKeys, NodeRole, Secret, Signature};

/// Canonical signature position in a settlement script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureSlot {
    Server,
    Client,
}

impl SignatureSlot {
    /// The slot a node of `role` signs into.
    pub fn of(role: NodeRole) -> Self {
        match role {
            NodeRole::Server => SignatureSlot::Server,
            NodeRole::Client => SignatureSlot::Client,
        }
    }

    /// Index of this slot among the script's elements (0 is the dummy).
    pub fn index(self) -> usize {
        match self {
            SignatureSlot::Server => 1,
            SignatureSlot::Client => 2,
        }
    }
}

/// Put a node's own and counterparty signatures into `(server slot, client slot)`.
///
/// A server node's own signature goes first, a client node's own second.
pub fn place_signatures<'a>(
    role: NodeRole,
    own: Option<&'a Signature>,
    counterparty: Option<&'a Signature>,
) -> (Option<&'a Signature>, Option<&'a Signature>) {
    match role {
        NodeRole::Server => (own, counterparty),
        NodeRole::Client => (counterparty, own),
    }
}

/// Stateless builder for settlement unlocking scripts.
///
/// Output depends only on the arguments, so either party can rebuild and
/// compare the other's script byte for byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptAssembler;

impl ScriptAssembler {
    pub fn new() -> Self {
        Self
    }

    /// 2-of-2 multisig over the channel keys, server key first.
    pub fn redeem_script(&self, keys: &ChannelKeys) -> Script {
        ScriptBuilder::new()
            .push_opcode(OP_2)
            .push_slice(&keys.server_pubkey)
            .push_slice(&keys.client_pubkey)
            .push_opcode(OP_2)
            .push_opcode(OP_CHECKMULTISIG)
            .into_script()
    }

    pub fn settlement_script_sig(
        &self,
        keys: &ChannelKeys,
        server_sig: Option<&Signature>,
        client_sig: Option<&Signature>,
        secret: Option<&Secret>,
        server_issued: bool,
        payment_to_server: bool,
    ) -> Script {
        let mut builder = ScriptBuilder::new()
            .push_opcode(OP_0)
            .push_slice(server_sig.map(Signature::as_bytes).unwrap_or_default())
            .push_slice(client_sig.map(Signature::as_bytes).unwrap_or_default());

        if let Some(secret) = secret {
            builder = builder.push_slice(secret.as_bytes());
        }

        builder
            .push_bool(payment_to_server)
            .push_bool(server_issued)
            .push_slice(self.redeem_script(keys).as_bytes())
            .into_script()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::tests::sample_signature;
    use crate::script::Instruction;
    use crate::script::opcodes::OP_1;

    fn keys() -> ChannelKeys {
        ChannelKeys {
            server_pubkey: vec![0x02; 33],
            client_pubkey: vec![0x03; 33],
        }
    }

    fn pushes(script: &Script) -> Vec<Vec<u8>> {
        script
            .instructions()
            .map(|i| match i.unwrap() {
                Instruction::Push(data) => data.to_vec(),
                Instruction::Op(op) => vec![op],
            })
            .collect()
    }

    #[test]
    fn same_inputs_give_identical_bytes() {
        let assembler = ScriptAssembler::new();
        let (a, b) = (sample_signature(0xaa), sample_signature(0xbb));
        let secret = Secret::new(b"preimage".to_vec());

        let first =
            assembler.settlement_script_sig(&keys(), Some(&a), Some(&b), Some(&secret), true, false);
        let second =
            assembler.settlement_script_sig(&keys(), Some(&a), Some(&b), Some(&secret), true, false);

        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn layout_has_signatures_secret_selectors_and_redeem_script() {
        let assembler = ScriptAssembler::new();
        let (server, client) = (sample_signature(0xaa), sample_signature(0xbb));
        let secret = Secret::new(b"preimage".to_vec());

        let script = assembler.settlement_script_sig(
            &keys(),
            Some(&server),
            Some(&client),
            Some(&secret),
            false,
            true,
        );
        let elements = pushes(&script);

        assert_eq!(elements.len(), 7);
        assert!(elements[0].is_empty());
        assert_eq!(elements[1], server.as_bytes());
        assert_eq!(elements[2], client.as_bytes());
        assert_eq!(elements[3], b"preimage");
        assert_eq!(elements[4], vec![OP_1]); // payment_to_server
        assert!(elements[5].is_empty()); // server_issued = false
        assert_eq!(elements[6], assembler.redeem_script(&keys()).as_bytes());
    }

    #[test]
    fn missing_signature_keeps_its_slot_as_placeholder() {
        let assembler = ScriptAssembler::new();
        let client = sample_signature(0xbb);

        let script =
            assembler.settlement_script_sig(&keys(), None, Some(&client), None, true, true);
        let elements = pushes(&script);

        assert!(elements[SignatureSlot::Server.index()].is_empty());
        assert_eq!(elements[SignatureSlot::Client.index()], client.as_bytes());
        // no secret: selectors follow the signatures directly
        assert_eq!(elements.len(), 6);
    }

    #[test]
    fn own_signature_position_depends_on_role() {
        let (own, theirs) = (sample_signature(0x01), sample_signature(0x02));

        let (server_slot, client_slot) = place_signatures(NodeRole::Server, Some(&own), Some(&theirs));
        assert_eq!(server_slot, Some(&own));
        assert_eq!(client_slot, Some(&theirs));

        let (server_slot, client_slot) = place_signatures(NodeRole::Client, Some(&own), Some(&theirs));
        assert_eq!(server_slot, Some(&theirs));
        assert_eq!(client_slot, Some(&own));
    }

    #[test]
    fn both_roles_build_the_same_script() {
        // server signed with 0x01, client with 0x02; each side rebuilds the script
        let assembler = ScriptAssembler::new();
        let (server_sig, client_sig) = (sample_signature(0x01), sample_signature(0x02));
        let secret = Secret::new(vec![9; 32]);

        let (s1, c1) = place_signatures(NodeRole::Server, Some(&server_sig), Some(&client_sig));
        let (s2, c2) = place_signatures(NodeRole::Client, Some(&client_sig), Some(&server_sig));

        let on_server = assembler.settlement_script_sig(&keys(), s1, c1, Some(&secret), true, true);
        let on_client = assembler.settlement_script_sig(&keys(), s2, c2, Some(&secret), true, true);
        assert_eq!(on_server, on_client);
    }
}
