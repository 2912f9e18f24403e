use axum::{
    extract::Extension,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use super::protocol::*;
use crate::error::DhtError;
use crate::membership::node::Node;
use crate::membership::types::Peer;

/// Inbound RPC surface of a node.
pub fn router(node: Arc<Node>) -> Router {
    Router::new()
        .route(ENDPOINT_JOIN, post(handle_join))
        .route(ENDPOINT_LEAVE, post(handle_leave))
        .route(ENDPOINT_NOTIFY_REBUILD, post(handle_notify_rebuild))
        .route(
            ENDPOINT_NOTIFY_REBUILD_COMPLETE,
            post(handle_notify_rebuild_complete),
        )
        .route(ENDPOINT_STORE, post(handle_store))
        .route(ENDPOINT_GET, post(handle_get))
        .route(ENDPOINT_HEALTH, get(handle_health))
        .layer(Extension(node))
}

pub async fn handle_join(
    Extension(node): Extension<Arc<Node>>,
    Json(req): Json<MembershipChangeRequest>,
) -> (StatusCode, Json<MembershipChangeResponse>) {
    let peers = node.admit(Peer::new(req.id, req.addr)).await;
    (
        StatusCode::OK,
        Json(MembershipChangeResponse {
            peers,
            success: true,
        }),
    )
}

pub async fn handle_leave(
    Extension(node): Extension<Arc<Node>>,
    Json(req): Json<MembershipChangeRequest>,
) -> (StatusCode, Json<MembershipChangeResponse>) {
    let peers = node.release(Peer::new(req.id, req.addr)).await;
    (
        StatusCode::OK,
        Json(MembershipChangeResponse {
            peers,
            success: true,
        }),
    )
}

pub async fn handle_notify_rebuild(
    Extension(node): Extension<Arc<Node>>,
    Json(req): Json<RebuildRequest>,
) -> (StatusCode, Json<RebuildResponse>) {
    node.apply_rebuild(Peer::new(req.id, req.addr), req.reason)
        .await;
    (StatusCode::OK, Json(RebuildResponse { success: true }))
}

pub async fn handle_notify_rebuild_complete(
    Extension(node): Extension<Arc<Node>>,
    Json(req): Json<RebuildRequest>,
) -> (StatusCode, Json<RebuildResponse>) {
    node.complete_rebuild(&req.id, req.reason).await;
    (StatusCode::OK, Json(RebuildResponse { success: true }))
}

pub async fn handle_store(
    Extension(node): Extension<Arc<Node>>,
    Json(req): Json<StoreRequest>,
) -> (StatusCode, Json<StoreResponse>) {
    node.store_local(req.key, req.value);
    (StatusCode::OK, Json(StoreResponse { success: true }))
}

pub async fn handle_get(
    Extension(node): Extension<Arc<Node>>,
    Json(req): Json<GetRequest>,
) -> (StatusCode, Json<GetResponse>) {
    match node.get(&req.key, req.forwarded).await {
        Ok(Some(value)) => (StatusCode::OK, Json(GetResponse::found(value))),
        Ok(None) => (StatusCode::OK, Json(GetResponse::not_found())),
        Err(e @ DhtError::InvalidState { .. }) => {
            tracing::debug!("[Get] Refused {}: {}", req.key, e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(GetResponse::not_found()),
            )
        }
        Err(e) => {
            tracing::error!("[Get] Failed {}: {}", req.key, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(GetResponse::not_found()),
            )
        }
    }
}

pub async fn handle_health(
    Extension(node): Extension<Arc<Node>>,
) -> (StatusCode, Json<HealthResponse>) {
    (StatusCode::OK, Json(node.health().await))
}
