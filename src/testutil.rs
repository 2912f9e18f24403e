//! In-process cluster helpers for tests.

use std::collections::HashMap;
use std::sync::Arc;

use tempfile::TempDir;
use tokio::net::TcpListener;

use crate::config::NodeConfig;
use crate::membership::node::Node;

/// Nothing listens here; connections are refused immediately.
pub(crate) const UNREACHABLE_ADDR: &str = "127.0.0.1:1";

pub(crate) struct TestNode {
    pub node: Arc<Node>,
    _data_dir: TempDir,
}

impl std::ops::Deref for TestNode {
    type Target = Arc<Node>;

    fn deref(&self) -> &Self::Target {
        &self.node
    }
}

/// Starts a node on an ephemeral localhost port with `keys` as its snapshot.
pub(crate) async fn spawn_node(id: &str, keys: &[(&str, &str)]) -> TestNode {
    spawn_node_joining(id, keys, None).await
}

/// Like `spawn_node`, with a bootstrap target configured.
pub(crate) async fn spawn_node_joining(
    id: &str,
    keys: &[(&str, &str)],
    join_addr: Option<&str>,
) -> TestNode {
    let data_dir = tempfile::tempdir().unwrap();
    let snapshot: HashMap<&str, &str> = keys.iter().copied().collect();
    std::fs::write(
        data_dir.path().join("seed.json"),
        serde_json::to_string(&snapshot).unwrap(),
    )
    .unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let mut config = NodeConfig::new(id, addr).with_data_dir(data_dir.path());
    if let Some(join_addr) = join_addr {
        config = config.with_join_addr(join_addr);
    }

    let node = Node::new(config);
    node.load_snapshot().unwrap();
    node.serve(listener);

    TestNode {
        node,
        _data_dir: data_dir,
    }
}

/// `count` keys of the form `key-<i>`, each mapped to `value-<i>`.
pub(crate) fn numbered_keys(count: usize) -> Vec<(String, String)> {
    (0..count)
        .map(|i| (format!("key-{}", i), format!("value-{}", i)))
        .collect()
}

pub(crate) fn as_refs(pairs: &[(String, String)]) -> Vec<(&str, &str)> {
    pairs
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect()
}
