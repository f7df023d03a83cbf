//! Node role: which side of the channel this process runs on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The side of the channel this node plays.
///
/// Passed to the scheduler at construction time; it decides which settlement
/// branches this node may claim and where its own signature goes in the
/// unlocking script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Server,
    Client,
}

impl NodeRole {
    pub fn is_server(self) -> bool {
        matches!(self, NodeRole::Server)
    }

    /// The other side of the channel.
    pub fn counterparty(self) -> Self {
        match self {
            NodeRole::Server => NodeRole::Client,
            NodeRole::Client => NodeRole::Server,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeRole::Server => "server",
            NodeRole::Client => "client",
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role name is neither `server` nor `client`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown node role: {0:?} (expected \"server\" or \"client\")")]
pub struct ParseRoleError(pub String);

impl FromStr for NodeRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "server" => Ok(NodeRole::Server),
            "client" => Ok(NodeRole::Client),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}
