use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::protocol::*;
use crate::config::RpcTimeouts;
use crate::error::{DhtError, Result};
use crate::membership::types::Peer;

/// Outbound side of the RPC transport.
///
/// Every call carries its own deadline. A transport error or an elapsed
/// deadline is a `Connection` error; a non-2xx status or `success == false`
/// is a `Protocol` error. Nothing is retried here.
#[derive(Clone)]
pub struct PeerClient {
    http: reqwest::Client,
    timeouts: RpcTimeouts,
}

impl PeerClient {
    pub fn new(timeouts: RpcTimeouts) -> Self {
        Self {
            http: reqwest::Client::new(),
            timeouts,
        }
    }

    async fn post<Req, Resp>(
        &self,
        addr: &str,
        endpoint: &str,
        payload: &Req,
        timeout: Duration,
    ) -> Result<(StatusCode, Resp)>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let response = self
            .http
            .post(format!("http://{}{}", addr, endpoint))
            .json(payload)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| DhtError::connection(addr, e))?;

        let status = response.status();
        let body: Resp = response
            .json()
            .await
            .map_err(|e| DhtError::protocol(addr, format!("{} (status {})", e, status)))?;

        Ok((status, body))
    }

    pub async fn join(&self, addr: &str, request: &MembershipChangeRequest) -> Result<Vec<Peer>> {
        tracing::debug!("Sending join request for {} to {}", request.id, addr);
        let (status, response): (_, MembershipChangeResponse) = self
            .post(addr, ENDPOINT_JOIN, request, self.timeouts.join)
            .await?;

        if !status.is_success() || !response.success {
            return Err(DhtError::protocol(
                addr,
                format!("join refused (status {})", status),
            ));
        }
        Ok(response.peers)
    }

    pub async fn leave(&self, addr: &str, request: &MembershipChangeRequest) -> Result<Vec<Peer>> {
        tracing::debug!("Sending leave request for {} to {}", request.id, addr);
        let (status, response): (_, MembershipChangeResponse) = self
            .post(addr, ENDPOINT_LEAVE, request, self.timeouts.leave)
            .await?;

        if !status.is_success() || !response.success {
            return Err(DhtError::protocol(
                addr,
                format!("leave refused (status {})", status),
            ));
        }
        Ok(response.peers)
    }

    pub async fn notify_rebuild(&self, addr: &str, request: &RebuildRequest) -> Result<()> {
        let (status, response): (_, RebuildResponse) = self
            .post(
                addr,
                ENDPOINT_NOTIFY_REBUILD,
                request,
                self.timeouts.notify_rebuild,
            )
            .await?;

        if !status.is_success() || !response.success {
            return Err(DhtError::protocol(
                addr,
                format!("rebuild notification refused (status {})", status),
            ));
        }
        Ok(())
    }

    pub async fn notify_rebuild_complete(&self, addr: &str, request: &RebuildRequest) -> Result<()> {
        let (status, response): (_, RebuildResponse) = self
            .post(
                addr,
                ENDPOINT_NOTIFY_REBUILD_COMPLETE,
                request,
                self.timeouts.notify_rebuild_complete,
            )
            .await?;

        if !status.is_success() || !response.success {
            return Err(DhtError::protocol(
                addr,
                format!("rebuild completion refused (status {})", status),
            ));
        }
        Ok(())
    }

    pub async fn store(&self, addr: &str, key: &str, value: &str) -> Result<()> {
        let request = StoreRequest {
            key: key.to_string(),
            value: value.to_string(),
        };
        let (status, response): (_, StoreResponse) = self
            .post(addr, ENDPOINT_STORE, &request, self.timeouts.store)
            .await?;

        if !status.is_success() || !response.success {
            return Err(DhtError::protocol(
                addr,
                format!("store of {} refused (status {})", key, status),
            ));
        }
        Ok(())
    }

    /// `Ok(None)` when the owner does not hold the key.
    pub async fn get(&self, addr: &str, key: &str, forwarded: bool) -> Result<Option<String>> {
        let request = GetRequest {
            key: key.to_string(),
            forwarded,
        };
        let (status, response): (_, GetResponse) = self
            .post(addr, ENDPOINT_GET, &request, self.timeouts.get)
            .await?;

        if !status.is_success() {
            return Err(DhtError::protocol(
                addr,
                format!("get of {} refused (status {})", key, status),
            ));
        }
        Ok(response.into_option())
    }
}
