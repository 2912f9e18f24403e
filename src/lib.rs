//! Peer-to-Peer Key-Value Store Library
//!
//! This library crate defines the modules that make up one store node.
//! It serves as the foundation for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//!
//! - **`membership`**: The coordination layer. Drives join and leave, notifies peers of
//!   rebuilds, and routes lookups to the node owning a key.
//! - **`storage`**: The partition function (SHA-256 prefix modulo the sorted peer ids),
//!   the in-memory shard and the JSON snapshot loader.
//! - **`rpc`**: The JSON-over-HTTP transport between nodes (axum server, reqwest client).
//! - **`console`**: The interactive operator console.
//! - **`config`**, **`error`**, **`logging`**: Static node configuration, the error
//!   taxonomy and tracing setup.

pub mod config;
pub mod console;
pub mod error;
pub mod logging;
pub mod membership;
pub mod rpc;
pub mod storage;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::NodeConfig;
pub use error::{DhtError, Result};
pub use membership::node::Node;
