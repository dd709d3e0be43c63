/// String key/value persistence backends.
pub mod kv_store;
/// Persisted record definitions.
pub mod models;
/// Per-game progress records on top of a key/value store.
pub mod progress_store;
/// Hosted question tables.
pub mod question_source;
/// Storage error types shared by the key/value backends.
pub mod storage;
