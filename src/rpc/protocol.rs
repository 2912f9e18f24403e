//! RPC Wire Protocol
//!
//! Endpoints and Data Transfer Objects exchanged between nodes. Every call is
//! a JSON `POST`; every response carries a `success` flag.

use serde::{Deserialize, Serialize};

use crate::membership::types::{NodeState, Peer, Reason};

// --- API Endpoints ---

/// A node asks a member to admit it.
pub const ENDPOINT_JOIN: &str = "/rpc/join";
/// A node asks a neighbour to remove it.
pub const ENDPOINT_LEAVE: &str = "/rpc/leave";
/// Coordinator tells remaining members to update their table and redistribute.
pub const ENDPOINT_NOTIFY_REBUILD: &str = "/rpc/notify_rebuild";
/// Initiator tells members the change is done and queries may resume.
pub const ENDPOINT_NOTIFY_REBUILD_COMPLETE: &str = "/rpc/notify_rebuild_complete";
/// Push a single key to its new owner.
pub const ENDPOINT_STORE: &str = "/rpc/store";
/// Look up a key, forwarded at most once to its owner.
pub const ENDPOINT_GET: &str = "/rpc/get";
/// Operator status, no protocol role.
pub const ENDPOINT_HEALTH: &str = "/health";

// --- Data Transfer Objects ---

/// Request for both `Join` and `Leave`: identity of the node changing membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipChangeRequest {
    pub id: String,
    pub addr: String,
}

/// Full peer list as seen by the coordinator after applying the change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipChangeResponse {
    pub peers: Vec<Peer>,
    pub success: bool,
}

/// Shared by `NotifyRebuild` and `NotifyRebuildComplete`.
///
/// For `NotifyRebuild`, `id`/`addr` name the joining or leaving peer.
/// For `NotifyRebuildComplete`, they name the sender.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebuildRequest {
    pub id: String,
    pub addr: String,
    pub reason: Reason,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebuildResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreRequest {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRequest {
    pub key: String,
    /// Set by a node relaying the lookup; the receiver answers locally only.
    #[serde(default)]
    pub forwarded: bool,
}

/// `success == false` with an empty value means the key is absent at its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetResponse {
    pub value: String,
    pub success: bool,
}

impl GetResponse {
    pub fn found(value: String) -> Self {
        Self {
            value,
            success: true,
        }
    }

    pub fn not_found() -> Self {
        Self {
            value: String::new(),
            success: false,
        }
    }

    pub fn into_option(self) -> Option<String> {
        self.success.then_some(self.value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub id: String,
    pub addr: String,
    pub state: NodeState,
    pub peers: usize,
    pub keys: usize,
}
