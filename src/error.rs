//! Error taxonomy shared by the node, the RPC client and the startup path.
//!
//! A missing key is never an error: lookups return `Ok(None)`.

use crate::membership::types::NodeState;

pub type Result<T> = std::result::Result<T, DhtError>;

#[derive(Debug, thiserror::Error)]
pub enum DhtError {
    /// The current node state forbids the operation. Raised before any network call.
    #[error("cannot {op} while node is {state}")]
    InvalidState { op: &'static str, state: NodeState },

    /// Peer unreachable, or the call deadline elapsed.
    #[error("connection to {addr} failed: {message}")]
    Connection { addr: String, message: String },

    /// The peer answered but reported failure.
    #[error("peer {addr} rejected the request: {message}")]
    Protocol { addr: String, message: String },

    #[error("failed to load snapshot {path}: {message}")]
    Snapshot { path: String, message: String },

    #[error("failed to listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not join via {addr} after {attempts} attempts: {last}")]
    BootstrapExhausted {
        addr: String,
        attempts: usize,
        last: Box<DhtError>,
    },
}

impl DhtError {
    pub fn connection(addr: &str, err: impl std::fmt::Display) -> Self {
        DhtError::Connection {
            addr: addr.to_string(),
            message: err.to_string(),
        }
    }

    pub fn protocol(addr: &str, message: impl Into<String>) -> Self {
        DhtError::Protocol {
            addr: addr.to_string(),
            message: message.into(),
        }
    }

    /// True for failures caused by the remote side or the network, which
    /// fan-out loops skip instead of escalating.
    pub fn is_peer_failure(&self) -> bool {
        matches!(
            self,
            DhtError::Connection { .. } | DhtError::Protocol { .. }
        )
    }
}
