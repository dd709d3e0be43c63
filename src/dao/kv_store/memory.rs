use dashmap::DashMap;

use crate::dao::{kv_store::KeyValueStore, storage::StorageResult};

/// Process-local store, lost on restart.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: DashMap<String, String>,
}

impl MemoryKeyValueStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    fn keys(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let mut keys = self
            .entries
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| entry.key().clone())
            .collect::<Vec<_>>();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrite_and_prefix_listing() {
        let store = MemoryKeyValueStore::new();
        store.set("trivia-game-b", "1").unwrap();
        store.set("trivia-game-a", "2").unwrap();
        store.set("trivia-asked-a", "[]").unwrap();
        store.set("trivia-game-a", "3").unwrap();

        assert_eq!(store.get("trivia-game-a").unwrap().as_deref(), Some("3"));
        assert_eq!(
            store.keys("trivia-game-").unwrap(),
            vec!["trivia-game-a".to_string(), "trivia-game-b".to_string()]
        );
        assert!(store.remove("trivia-game-a").unwrap());
        assert!(!store.remove("trivia-game-a").unwrap());
        assert!(store.get("trivia-game-a").unwrap().is_none());
    }
}
