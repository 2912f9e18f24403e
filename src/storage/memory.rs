use dashmap::DashMap;

/// In-memory shard held by this node.
///
/// Filled from the startup snapshot and by inbound `Store` calls; emptied of
/// keys that redistribution hands off to their new owners.
#[derive(Debug, Default)]
pub struct LocalStore {
    data: DashMap<String, String>,
}

impl LocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert. Idempotent for repeated identical writes.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn extend(&self, entries: impl IntoIterator<Item = (String, String)>) {
        for (key, value) in entries {
            self.data.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.data.get(key).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Removes `key` only while it still maps to `expected`.
    ///
    /// Used after handing a key off, so a newer value written concurrently
    /// by an inbound `Store` survives.
    pub fn remove_if_unchanged(&self, key: &str, expected: &str) -> bool {
        self.data
            .remove_if(key, |_, value| value == expected)
            .is_some()
    }

    /// Point-in-time copy of every entry, ordered by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .data
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries().into_iter().map(|(key, _)| key).collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
