//! Local Storage Module
//!
//! Holds the shard this node believes it owns and decides which node owns a key.
//!
//! ## Core Concepts
//! - **Partitioning**: A key's owner is `sorted_peer_ids[sha256_prefix(key) % N]`.
//!   Any node evaluating the same peer table picks the same owner.
//! - **Local store**: A concurrent in-memory map seeded from a JSON snapshot directory.
//! - **Redistribution**: After a membership change, keys owned elsewhere are pushed
//!   to their new owner (see `membership::node`).

pub mod memory;
pub mod partitioner;
pub mod snapshot;
