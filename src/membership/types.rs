use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Lifecycle of a node with respect to the cluster.
///
/// `Free` -> `InDHT` when a join completes; every member passes through
/// `Rebuilding` while a membership change is in flight and refuses queries there.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum NodeState {
    #[default]
    Free,
    InDHT,
    Rebuilding,
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeState::Free => write!(f, "free"),
            NodeState::InDHT => write!(f, "in-dht"),
            NodeState::Rebuilding => write!(f, "rebuilding"),
        }
    }
}

/// Why a rebuild was triggered; tells receivers whether to add or drop the peer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Reason {
    Join,
    Leave,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Join => write!(f, "join"),
            Reason::Leave => write!(f, "leave"),
        }
    }
}

/// Wire-level member entry, used in membership responses and fan-outs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Peer {
    pub id: String,
    pub addr: String,
}

impl Peer {
    pub fn new(id: impl Into<String>, addr: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            addr: addr.into(),
        }
    }
}

/// A node's local view of membership: peer id -> network address.
///
/// Not authoritative; two nodes may briefly hold different tables.
/// Equality is set equality over the id/address pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerTable {
    entries: HashMap<String, String>,
}

impl PeerTable {
    /// A table holding only the given node.
    pub fn with_self(id: &str, addr: &str) -> Self {
        let mut table = Self::default();
        table.insert(id, addr);
        table
    }

    pub fn from_peers<'a>(peers: impl IntoIterator<Item = &'a Peer>) -> Self {
        let mut table = Self::default();
        table.merge(peers);
        table
    }

    pub fn insert(&mut self, id: &str, addr: &str) {
        self.entries.insert(id.to_string(), addr.to_string());
    }

    pub fn remove(&mut self, id: &str) -> Option<String> {
        self.entries.remove(id)
    }

    /// Adds or overwrites every given peer; existing entries not listed are kept.
    pub fn merge<'a>(&mut self, peers: impl IntoIterator<Item = &'a Peer>) {
        for peer in peers {
            self.insert(&peer.id, &peer.addr);
        }
    }

    pub fn addr_of(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Peer ids in lexicographic order, independent of map iteration order.
    pub fn sorted_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// All entries as wire peers, ordered by id.
    pub fn peers(&self) -> Vec<Peer> {
        self.sorted_ids()
            .into_iter()
            .map(|id| Peer::new(id, &self.entries[id]))
            .collect()
    }

    /// All entries except the given ids, ordered by id.
    pub fn peers_except(&self, skip: &[&str]) -> Vec<Peer> {
        self.peers()
            .into_iter()
            .filter(|peer| !skip.contains(&peer.id.as_str()))
            .collect()
    }
}

/// NodeState and PeerTable, guarded together so each transition is atomic.
#[derive(Debug, Clone)]
pub struct ClusterView {
    pub state: NodeState,
    pub peers: PeerTable,
}
