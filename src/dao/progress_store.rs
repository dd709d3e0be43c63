use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::dao::{
    kv_store::KeyValueStore,
    models::{GameRecordEntity, ProgressEntity, SavedGameEntity},
    storage::{StorageError, StorageResult},
};

/// Session records for one game type, namespaced as `"<game_type>-game-<id>"`.
///
/// Every read treats missing keys and unparseable JSON as "absent"; corruption
/// is never surfaced to callers.
#[derive(Clone)]
pub struct ProgressStore {
    kv: Arc<dyn KeyValueStore>,
    game_type: &'static str,
}

impl ProgressStore {
    /// Build a store for `game_type` on top of a key-value backend.
    pub fn new(kv: Arc<dyn KeyValueStore>, game_type: &'static str) -> Self {
        Self { kv, game_type }
    }

    fn record_prefix(&self) -> String {
        format!("{}-game-", self.game_type)
    }

    fn record_key(&self, id: Uuid) -> String {
        format!("{}{}", self.record_prefix(), id)
    }

    fn asked_key(&self, id: Uuid) -> String {
        format!("{}-asked-{}", self.game_type, id)
    }

    /// Load the record for `id`; absent, unreadable or malformed data yields `None`.
    pub fn load(&self, id: Uuid) -> Option<GameRecordEntity> {
        self.read_json(&self.record_key(id))
    }

    /// Persist a brand-new record, overwriting any record with the same id.
    pub fn create(&self, record: &GameRecordEntity) -> StorageResult<()> {
        self.write_json(&self.record_key(record.id), record)
    }

    /// Merge `progress` into the stored record and overwrite it.
    ///
    /// Returns `Ok(false)` without writing when no record exists for `id`.
    pub fn save(&self, id: Uuid, progress: ProgressEntity) -> StorageResult<bool> {
        let Some(mut record) = self.load(id) else {
            return Ok(false);
        };
        record.progress = Some(progress);
        self.write_json(&self.record_key(id), &record)?;
        Ok(true)
    }

    /// Best-effort teardown save: skipped silently when the record is gone, failures only logged.
    pub fn autosave(&self, id: Uuid, progress: ProgressEntity) {
        match self.save(id, progress) {
            Ok(true) => debug!(game_type = self.game_type, %id, "progress autosaved"),
            Ok(false) => debug!(
                game_type = self.game_type,
                %id,
                "record no longer exists; autosave skipped"
            ),
            Err(err) => warn!(
                game_type = self.game_type,
                %id,
                error = %err,
                "autosave failed"
            ),
        }
    }

    /// Replace the team names of a stored record.
    pub fn update_teams(&self, id: Uuid, teams: Vec<String>) -> StorageResult<bool> {
        let Some(mut record) = self.load(id) else {
            return Ok(false);
        };
        record.teams = teams;
        self.write_json(&self.record_key(id), &record)?;
        Ok(true)
    }

    /// Mirror the asked set under its own key so it survives an abrupt shutdown.
    pub fn save_asked(&self, id: Uuid, asked: &[String]) -> StorageResult<()> {
        self.write_json(&self.asked_key(id), &asked)
    }

    /// Read the mirrored asked set, if any.
    pub fn load_asked(&self, id: Uuid) -> Option<Vec<String>> {
        self.read_json(&self.asked_key(id))
    }

    /// Delete the record and its mirrored asked set.
    pub fn delete(&self, id: Uuid) -> StorageResult<bool> {
        let removed = self.kv.remove(&self.record_key(id))?;
        self.kv.remove(&self.asked_key(id))?;
        Ok(removed)
    }

    /// Every parseable record of this game type, oldest first.
    pub fn list(&self) -> StorageResult<Vec<SavedGameEntity>> {
        let keys = self.kv.keys(&self.record_prefix())?;
        let mut games = keys
            .iter()
            .filter_map(|key| self.read_json::<GameRecordEntity>(key))
            .map(SavedGameEntity::from)
            .collect::<Vec<_>>();
        games.sort_by_key(|game| game.record.created_at);
        Ok(games)
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.kv.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(key, error = %err, "failed to read record; treating as absent");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, error = %err, "discarding malformed record");
                None
            }
        }
    }

    fn write_json<T: serde::Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.kv.set(key, &raw)
    }
}
