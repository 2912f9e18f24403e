//! Node-to-Node RPC Module
//!
//! JSON over HTTP: one `POST` endpoint per call, served by axum and issued with reqwest.
//!
//! ## Submodules
//! - **`protocol`**: Endpoints and request/response types.
//! - **`client`**: Outbound calls, each with its own deadline.
//! - **`handlers`**: Inbound handlers that delegate to the local `Node`.

pub mod client;
pub mod handlers;
pub mod protocol;

#[cfg(test)]
mod tests;
