//! Membership & Routing Module
//!
//! Coordinates cluster membership and routes lookups to the responsible node.
//!
//! ## Core Mechanisms
//! - **Join**: The joiner asks one member to admit it. That member enters `Rebuilding`,
//!   redistributes its keys and notifies every other peer, which does the same. The joiner
//!   then merges the returned table and announces completion, moving everyone back to `InDHT`.
//! - **Leave**: Symmetric. A neighbour coordinates, and the leaver hands off its keys and becomes `Free`.
//! - **Best-effort fan-out**: An unreachable peer is logged and skipped. There is no
//!   consensus round, so overlapping changes can leave tables briefly divergent.
//! - **Routing**: A lookup is answered locally or forwarded exactly once to the owner.

pub mod fanout;
pub mod node;
pub mod retry;
pub mod types;
