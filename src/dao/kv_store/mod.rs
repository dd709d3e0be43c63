mod file;
mod memory;

pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;

use crate::dao::storage::StorageResult;

/// Synchronous string key-value layer holding whole serialized records.
///
/// Writes overwrite the previous value entirely; there are no partial updates
/// and no optimistic concurrency checks (last write wins).
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    /// Overwrite the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    /// Remove `key`, returning whether something was deleted.
    fn remove(&self, key: &str) -> StorageResult<bool>;
    /// List every key starting with `prefix`, sorted.
    fn keys(&self, prefix: &str) -> StorageResult<Vec<String>>;
}
