//! RPC Module Tests
//!
//! Exercises the HTTP transport against live in-process nodes.
//!
//! ## Test Scopes
//! - **Wire format**: Request defaults and response helpers.
//! - **Client error mapping**: Unreachable peers vs refusals vs not-found.
//! - **Handlers**: Store/Get round trip and state preconditions over the wire.

#[cfg(test)]
mod tests {
    use crate::config::RpcTimeouts;
    use crate::error::DhtError;
    use crate::membership::types::{NodeState, Reason};
    use crate::rpc::client::PeerClient;
    use crate::rpc::protocol::{GetRequest, GetResponse, HealthResponse, RebuildRequest};
    use crate::testutil::{spawn_node, UNREACHABLE_ADDR};

    fn client() -> PeerClient {
        PeerClient::new(RpcTimeouts::default())
    }

    // ============================================================
    // WIRE FORMAT
    // ============================================================

    #[test]
    fn test_get_request_forwarded_defaults_to_false() {
        let req: GetRequest = serde_json::from_str(r#"{"key": "alpha"}"#).unwrap();
        assert_eq!(req.key, "alpha");
        assert!(!req.forwarded);
    }

    #[test]
    fn test_get_response_not_found_is_empty() {
        let resp = GetResponse::not_found();
        assert!(!resp.success);
        assert!(resp.value.is_empty());
        assert!(resp.into_option().is_none());

        assert_eq!(
            GetResponse::found("v".to_string()).into_option(),
            Some("v".to_string())
        );
    }

    // ============================================================
    // CLIENT ERROR MAPPING
    // ============================================================

    #[tokio::test]
    async fn test_unreachable_peer_is_connection_error() {
        let result = client().store(UNREACHABLE_ADDR, "k", "v").await;
        assert!(matches!(result, Err(DhtError::Connection { .. })));
    }

    #[tokio::test]
    async fn test_get_on_free_node_is_refused() {
        let node = spawn_node("node-a", &[("alpha", "1")]).await;

        let result = client().get(node.peer_addr(), "alpha", false).await;

        assert!(matches!(result, Err(DhtError::Protocol { .. })));
    }

    // ============================================================
    // HANDLERS
    // ============================================================

    #[tokio::test]
    async fn test_store_accepted_in_any_state() {
        let node = spawn_node("node-a", &[]).await;
        assert_eq!(node.state().await, NodeState::Free);

        client()
            .store(node.peer_addr(), "alpha", "1")
            .await
            .unwrap();

        assert_eq!(node.store().get("alpha"), Some("1".to_string()));
    }

    #[tokio::test]
    async fn test_store_then_get_round_trip() {
        let node = spawn_node("node-a", &[]).await;
        let request = RebuildRequest {
            id: "node-x".to_string(),
            addr: UNREACHABLE_ADDR.to_string(),
            reason: Reason::Join,
        };
        client()
            .notify_rebuild_complete(node.peer_addr(), &request)
            .await
            .unwrap();
        assert_eq!(node.state().await, NodeState::InDHT);

        client()
            .store(node.peer_addr(), "alpha", "1")
            .await
            .unwrap();

        let found = client().get(node.peer_addr(), "alpha", false).await.unwrap();
        assert_eq!(found, Some("1".to_string()));

        let missing = client().get(node.peer_addr(), "beta", false).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_health_reports_node_status() {
        let node = spawn_node("node-a", &[("alpha", "1"), ("beta", "2")]).await;

        let health: HealthResponse =
            reqwest::get(format!("http://{}/health", node.peer_addr()))
                .await
                .unwrap()
                .json()
                .await
                .unwrap();

        assert_eq!(health.id, "node-a");
        assert_eq!(health.state, NodeState::Free);
        assert_eq!(health.peers, 1);
        assert_eq!(health.keys, 2);
    }
}
