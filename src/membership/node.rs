use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use super::fanout::{fan_out, FanOutReport};
use super::retry::RetryPolicy;
use super::types::{ClusterView, NodeState, Peer, PeerTable, Reason};
use crate::config::NodeConfig;
use crate::error::{DhtError, Result};
use crate::rpc::client::PeerClient;
use crate::rpc::handlers::router;
use crate::rpc::protocol::{HealthResponse, MembershipChangeRequest, RebuildRequest};
use crate::storage::memory::LocalStore;
use crate::storage::partitioner::responsible_peer;
use crate::storage::snapshot;

/// One cluster member: identity, membership view, local shard and RPC client.
///
/// `view` guards NodeState and PeerTable together. It is never held across
/// an outbound call, so inbound handlers on this node can always make
/// progress while a local operation waits on a peer.
pub struct Node {
    config: NodeConfig,
    view: RwLock<ClusterView>,
    store: LocalStore,
    client: PeerClient,
    /// Serializes join/leave initiated from this process.
    local_change: Mutex<()>,
}

impl Node {
    pub fn new(config: NodeConfig) -> Arc<Self> {
        let view = ClusterView {
            state: NodeState::Free,
            peers: PeerTable::with_self(&config.id, &config.peer_addr),
        };
        Arc::new(Self {
            client: PeerClient::new(config.timeouts),
            view: RwLock::new(view),
            store: LocalStore::new(),
            local_change: Mutex::new(()),
            config,
        })
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn peer_addr(&self) -> &str {
        &self.config.peer_addr
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub async fn state(&self) -> NodeState {
        self.view.read().await.state
    }

    pub async fn peer_table(&self) -> PeerTable {
        self.view.read().await.peers.clone()
    }

    pub async fn health(&self) -> HealthResponse {
        let view = self.view.read().await;
        HealthResponse {
            id: self.config.id.clone(),
            addr: self.config.peer_addr.clone(),
            state: view.state,
            peers: view.peers.len(),
            keys: self.store.len(),
        }
    }

    fn self_request(&self, reason: Reason) -> RebuildRequest {
        RebuildRequest {
            id: self.config.id.clone(),
            addr: self.config.peer_addr.clone(),
            reason,
        }
    }

    // --- Startup ---

    /// Seeds the local store from the snapshot directory, binds the RPC
    /// listener and starts serving. Node state stays `Free`.
    pub async fn start(self: &Arc<Self>) -> Result<JoinHandle<()>> {
        self.load_snapshot()?;

        let listener = TcpListener::bind(&self.config.bind_addr)
            .await
            .map_err(|source| DhtError::Bind {
                addr: self.config.bind_addr.clone(),
                source,
            })?;

        Ok(self.serve(listener))
    }

    pub fn load_snapshot(&self) -> Result<usize> {
        let entries = snapshot::load_dir(&self.config.data_dir)?;
        let count = entries.len();
        self.store.extend(entries);
        Ok(count)
    }

    /// Serves the RPC endpoints on an already bound listener.
    pub fn serve(self: &Arc<Self>, listener: TcpListener) -> JoinHandle<()> {
        let app = router(self.clone());
        let bind = listener
            .local_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| self.config.bind_addr.clone());

        tracing::info!("Node {} listening at {}", self.config.id, bind);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("RPC server on {} stopped: {}", bind, e);
            }
        })
    }

    /// Joins the configured bootstrap target with the default retry policy.
    pub async fn bootstrap(&self) -> Result<()> {
        self.bootstrap_with(RetryPolicy::bootstrap()).await
    }

    /// No target, or a target equal to this node, leaves the node `Free`.
    pub async fn bootstrap_with(&self, policy: RetryPolicy) -> Result<()> {
        let Some(target) = self.config.bootstrap_target() else {
            tracing::info!("[Bootstrap] No valid join address; skipping");
            return Ok(());
        };

        tracing::info!("[Bootstrap] Attempting to join cluster at {}", target);
        match policy.run("Bootstrap", move || self.join(target)).await {
            Ok(peers) => {
                tracing::info!("[Bootstrap] Joined cluster with {} peers", peers.len());
                Ok(())
            }
            Err(e) if e.is_peer_failure() => Err(DhtError::BootstrapExhausted {
                addr: target.to_string(),
                attempts: policy.max_attempts(),
                last: Box::new(e),
            }),
            Err(e) => Err(e),
        }
    }

    // --- Locally initiated membership changes ---

    /// Joins the cluster through the member at `addr`.
    ///
    /// On success the returned table is merged, the node becomes `InDHT`,
    /// hands off snapshot keys it no longer owns, and tells every peer the
    /// rebuild is complete. Nothing is rolled back on the remote side if the
    /// join call itself fails.
    pub async fn join(&self, addr: &str) -> Result<Vec<Peer>> {
        let _guard = self.local_change.lock().await;

        let state = self.state().await;
        match state {
            NodeState::Free => {}
            NodeState::InDHT | NodeState::Rebuilding => {
                return Err(DhtError::InvalidState { op: "join", state });
            }
        }

        tracing::info!("[Join] Sending join request to {}", addr);
        let request = MembershipChangeRequest {
            id: self.config.id.clone(),
            addr: self.config.peer_addr.clone(),
        };
        let peers = self.client.join(addr, &request).await?;

        let table = {
            let mut view = self.view.write().await;
            view.peers.merge(&peers);
            view.peers.insert(&self.config.id, &self.config.peer_addr);
            view.state = NodeState::InDHT;
            view.peers.clone()
        };
        tracing::info!("[Join] Admitted; cluster has {} peers", table.len());

        self.redistribute_under(&table).await.log("Join redistribute");
        self.notify_rebuild_complete(&table.peers_except(&[self.id()]), Reason::Join)
            .await
            .log("Join complete");

        Ok(table.peers())
    }

    /// Leaves the cluster.
    ///
    /// Alone in its table the node just turns `Free` without any network call.
    /// Otherwise a neighbour coordinates the change, this node hands off every
    /// key to its owner under the remaining members, resets its table to
    /// itself and announces completion.
    pub async fn leave(&self) -> Result<()> {
        let _guard = self.local_change.lock().await;

        let (previous, neighbour) = {
            let mut view = self.view.write().await;
            let previous = view.state;
            match previous {
                NodeState::Free => {
                    return Err(DhtError::InvalidState {
                        op: "leave",
                        state: previous,
                    });
                }
                NodeState::InDHT | NodeState::Rebuilding => {}
            }

            let Some(neighbour) = view.peers.peers_except(&[self.id()]).into_iter().next() else {
                view.peers = PeerTable::with_self(&self.config.id, &self.config.peer_addr);
                view.state = NodeState::Free;
                tracing::info!("[Leave] No other members; node is free");
                return Ok(());
            };

            view.state = NodeState::Rebuilding;
            (previous, neighbour)
        };

        tracing::info!("[Leave] Sending leave request via {}", neighbour.id);
        let request = MembershipChangeRequest {
            id: self.config.id.clone(),
            addr: self.config.peer_addr.clone(),
        };
        let peers = match self.client.leave(&neighbour.addr, &request).await {
            Ok(peers) => peers,
            Err(e) => {
                self.view.write().await.state = previous;
                return Err(e);
            }
        };

        let remaining: Vec<Peer> = peers
            .into_iter()
            .filter(|peer| peer.id != self.config.id)
            .collect();
        let remaining_table = PeerTable::from_peers(&remaining);

        self.redistribute_under(&remaining_table)
            .await
            .log("Leave redistribute");

        {
            let mut view = self.view.write().await;
            view.peers = PeerTable::with_self(&self.config.id, &self.config.peer_addr);
            view.state = NodeState::Free;
        }

        self.notify_rebuild_complete(&remaining, Reason::Leave)
            .await
            .log("Leave complete");

        tracing::info!("[Leave] Left cluster; {} keys kept locally", self.store.len());
        Ok(())
    }

    // --- Outbound fan-outs ---

    /// Tells `targets` that `subject` joined or left. Each receiver updates its
    /// table and redistributes its own store.
    pub async fn notify_rebuild(&self, targets: &[Peer], subject: &Peer, reason: Reason) -> FanOutReport {
        let request = RebuildRequest {
            id: subject.id.clone(),
            addr: subject.addr.clone(),
            reason,
        };
        let request = &request;
        let client = &self.client;

        let targets = targets
            .iter()
            .map(|peer| (peer.id.clone(), peer.addr.clone()))
            .collect();

        fan_out(targets, move |addr: String| async move {
            client.notify_rebuild(&addr, request).await
        })
        .await
    }

    /// Tells `targets` the membership change is done.
    pub async fn notify_rebuild_complete(&self, targets: &[Peer], reason: Reason) -> FanOutReport {
        let request = self.self_request(reason);
        let request = &request;
        let client = &self.client;

        let targets = targets
            .iter()
            .filter(|peer| peer.id != self.config.id)
            .map(|peer| (peer.id.clone(), peer.addr.clone()))
            .collect();

        fan_out(targets, move |addr: String| async move {
            client.notify_rebuild_complete(&addr, request).await
        })
        .await
    }

    /// Pushes every key this node does not own under its current table.
    pub async fn redistribute(&self) -> FanOutReport {
        let table = self.peer_table().await;
        self.redistribute_under(&table).await
    }

    /// Pushes every local key whose owner under `table` is another node.
    ///
    /// A key is dropped locally only after its owner confirmed the `Store`
    /// and only if the local value did not change meanwhile. Keys that fail
    /// stay put until the next rebuild.
    pub async fn redistribute_under(&self, table: &PeerTable) -> FanOutReport {
        let moves: Vec<(String, (String, String, String))> = self
            .store
            .entries()
            .into_iter()
            .filter_map(|(key, value)| {
                let owner = responsible_peer(&key, table)?;
                if owner == self.config.peer_addr {
                    return None;
                }
                Some((key.clone(), (owner.to_string(), key, value)))
            })
            .collect();

        if !moves.is_empty() {
            tracing::info!("[Redistribute] Handing off {} keys", moves.len());
        }

        let client = &self.client;
        let store = &self.store;
        fan_out(moves, move |(owner, key, value): (String, String, String)| async move {
            client.store(&owner, &key, &value).await?;
            store.remove_if_unchanged(&key, &value);
            tracing::debug!("[Redistribute] Moved {} to {}", key, owner);
            Ok(())
        })
        .await
    }

    // --- Inbound protocol steps ---

    /// Coordinator side of a join: admit the peer, rebuild, notify the rest.
    pub async fn admit(&self, joining: Peer) -> Vec<Peer> {
        tracing::info!("[Join] Request from {} at {}", joining.id, joining.addr);
        let peers = {
            let mut view = self.view.write().await;
            view.state = NodeState::Rebuilding;
            view.peers.insert(&joining.id, &joining.addr);
            view.peers.peers()
        };

        self.redistribute().await.log("Join redistribute");

        let targets: Vec<Peer> = peers
            .iter()
            .filter(|peer| peer.id != self.config.id && peer.id != joining.id)
            .cloned()
            .collect();
        self.notify_rebuild(&targets, &joining, Reason::Join)
            .await
            .log("Join notify");

        peers
    }

    /// Coordinator side of a leave: drop the peer, rebuild, notify the rest.
    pub async fn release(&self, leaving: Peer) -> Vec<Peer> {
        tracing::info!("[Leave] Request from {} at {}", leaving.id, leaving.addr);
        let peers = {
            let mut view = self.view.write().await;
            view.state = NodeState::Rebuilding;
            if leaving.id != self.config.id {
                view.peers.remove(&leaving.id);
            }
            view.peers.peers()
        };

        self.redistribute().await.log("Leave redistribute");

        let targets: Vec<Peer> = peers
            .iter()
            .filter(|peer| peer.id != self.config.id)
            .cloned()
            .collect();
        self.notify_rebuild(&targets, &leaving, Reason::Leave)
            .await
            .log("Leave notify");

        peers
    }

    /// Receiver side of a rebuild notification.
    pub async fn apply_rebuild(&self, subject: Peer, reason: Reason) {
        tracing::info!("[Rebuild] {} {} at {}", reason, subject.id, subject.addr);
        {
            let mut view = self.view.write().await;
            view.state = NodeState::Rebuilding;
            match reason {
                Reason::Join => view.peers.insert(&subject.id, &subject.addr),
                Reason::Leave => {
                    if subject.id != self.config.id {
                        view.peers.remove(&subject.id);
                    }
                }
            }
        }

        self.redistribute().await.log("Rebuild redistribute");
    }

    /// Receiver side of a completion notification: back to `InDHT`, unconditionally.
    pub async fn complete_rebuild(&self, sender: &str, reason: Reason) {
        let mut view = self.view.write().await;
        match view.state {
            NodeState::Rebuilding => {}
            NodeState::InDHT | NodeState::Free => {
                tracing::debug!(
                    "[Rebuild] Completion from {} while {}",
                    sender,
                    view.state
                );
            }
        }
        view.state = NodeState::InDHT;
        tracing::info!("[Rebuild] {} by {} complete", reason, sender);
    }

    /// Unconditional upsert; valid in any state.
    pub fn store_local(&self, key: String, value: String) {
        tracing::debug!("[Store] key {}", key);
        self.store.insert(key, value);
    }

    // --- Lookups ---

    /// Routed lookup. Refused unless `InDHT`. A key owned elsewhere is
    /// forwarded once; a failed forward reads as not found.
    pub async fn get(&self, key: &str, forwarded: bool) -> Result<Option<String>> {
        let owner = {
            let view = self.view.read().await;
            match view.state {
                NodeState::InDHT => {}
                NodeState::Free | NodeState::Rebuilding => {
                    return Err(DhtError::InvalidState {
                        op: "get",
                        state: view.state,
                    });
                }
            }
            responsible_peer(key, &view.peers).map(str::to_string)
        };

        match owner {
            Some(owner) if owner != self.config.peer_addr && !forwarded => {
                tracing::debug!("[Get] Forwarding {} to {}", key, owner);
                match self.client.get(&owner, key, true).await {
                    Ok(value) => Ok(value),
                    Err(e) => {
                        tracing::warn!("[Get] Forward of {} to {} failed: {}", key, owner, e);
                        Ok(None)
                    }
                }
            }
            _ => Ok(self.store.get(key)),
        }
    }

    /// Direct lookup against the node at `addr`. Only a `Free` node acts
    /// as an outside client; a member must use routed `get`.
    pub async fn query(&self, addr: &str, key: &str) -> Result<Option<String>> {
        let state = self.state().await;
        match state {
            NodeState::Free => {}
            NodeState::InDHT | NodeState::Rebuilding => {
                return Err(DhtError::InvalidState { op: "query", state });
            }
        }

        tracing::info!("[Query] {} at {}", key, addr);
        self.client.get(addr, key, false).await
    }
}
