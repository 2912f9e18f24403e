use sha2::{Digest, Sha256};

use crate::membership::types::PeerTable;

/// First 8 bytes of the key's SHA-256 digest, read big-endian.
pub fn hash_key(key: &str) -> u64 {
    let digest = Sha256::digest(key.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix)
}

/// Index into the sorted peer ids that owns `key` among `peer_count` peers.
pub fn owner_index(key: &str, peer_count: usize) -> usize {
    (hash_key(key) % peer_count as u64) as usize
}

/// Address of the peer responsible for `key` under `peers`.
///
/// Ids are sorted so every node evaluating the same table picks the same owner.
/// Modulo placement: a membership change moves most keys. Returns `None` only
/// for an empty table, which a node's own table never is.
pub fn responsible_peer<'a>(key: &str, peers: &'a PeerTable) -> Option<&'a str> {
    if peers.is_empty() {
        return None;
    }
    let ids = peers.sorted_ids();
    let id = ids[owner_index(key, ids.len())];
    peers.addr_of(id)
}
