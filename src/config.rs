use std::path::PathBuf;
use std::time::Duration;

/// Per-call deadlines for outbound RPCs.
#[derive(Debug, Clone, Copy)]
pub struct RpcTimeouts {
    pub join: Duration,
    pub leave: Duration,
    pub notify_rebuild: Duration,
    pub notify_rebuild_complete: Duration,
    pub store: Duration,
    pub get: Duration,
}

impl Default for RpcTimeouts {
    fn default() -> Self {
        Self {
            join: Duration::from_secs(3),
            leave: Duration::from_secs(3),
            notify_rebuild: Duration::from_secs(2),
            notify_rebuild_complete: Duration::from_secs(2),
            store: Duration::from_secs(2),
            get: Duration::from_secs(2),
        }
    }
}

/// Static identity and addressing of one node, fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub id: String,
    /// Address the RPC server listens on.
    pub bind_addr: String,
    /// Address other peers use to reach this node.
    pub peer_addr: String,
    pub join_addr: Option<String>,
    pub data_dir: PathBuf,
    pub timeouts: RpcTimeouts,
}

impl NodeConfig {
    /// Builds a config where the node listens on the address it advertises
    /// and reads its snapshot from `data/<id>`.
    pub fn new(id: impl Into<String>, peer_addr: impl Into<String>) -> Self {
        let id = id.into();
        let peer_addr = peer_addr.into();
        Self {
            data_dir: PathBuf::from("data").join(&id),
            bind_addr: peer_addr.clone(),
            peer_addr,
            id,
            join_addr: None,
            timeouts: RpcTimeouts::default(),
        }
    }

    pub fn with_join_addr(mut self, join_addr: impl Into<String>) -> Self {
        self.join_addr = Some(join_addr.into());
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_bind_addr(mut self, bind_addr: impl Into<String>) -> Self {
        self.bind_addr = bind_addr.into();
        self
    }

    pub fn with_timeouts(mut self, timeouts: RpcTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// The configured bootstrap target, unless it is absent or points at this node.
    pub fn bootstrap_target(&self) -> Option<&str> {
        match self.join_addr.as_deref() {
            Some(addr) if !addr.is_empty() && addr != self.peer_addr => Some(addr),
            _ => None,
        }
    }
}
