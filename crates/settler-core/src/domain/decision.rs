//! Claim decision: who may claim a revealed settlement branch.
//!
//! Pure function, no I/O. The scheduler acts on the result.

use super::role::NodeRole;

/// Result of the authorization check for a revealed payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimDecision {
    /// This node builds, signs, and broadcasts the settlement.
    Claim,
    /// Only the counterparty may claim this branch.
    Refuse,
}

/// Decide whether `role` may claim a settlement branch.
///
/// - A payment towards the server on a server-issued branch is claimable only
///   by the server.
/// - A payment towards the client on a client-issued branch is claimable only
///   by the client.
/// - Every other combination may be claimed by either side.
pub fn authorize(payment_to_server: bool, server_issued: bool, role: NodeRole) -> ClaimDecision {
    let refused = match (payment_to_server, server_issued) {
        (true, true) => !role.is_server(),
        (false, false) => role.is_server(),
        _ => false,
    };
    if refused {
        ClaimDecision::Refuse
    } else {
        ClaimDecision::Claim
    }
}
