//! Injectable key-value persistence for session convenience data.
//!
//! Keeps `{currentSession, setupHistory, lastSetup}` as JSON blobs under
//! fixed keys: a small get/set/clear trait with a JSON-file implementation
//! for real runs and an in-memory one for tests. The session-layer helpers
//! own the keys and the capped most-recent-first history policy.

use crate::config::InterviewType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

const CURRENT_SESSION_KEY: &str = "currentSession";
const SETUP_HISTORY_KEY: &str = "setupHistory";
const LAST_SETUP_KEY: &str = "lastSetup";

/// Most-recent-first retention cap for the setup history.
const HISTORY_CAP: usize = 10;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Get/set/clear contract shared by every backing store.
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// Volatile store for tests and `--store-path`-less embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        Ok(())
    }
}

/// One JSON object on disk, rewritten on every mutation. Small data, simple
/// durability.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl JsonFileStore {
    /// Load the store, starting empty when the file is missing or
    /// unreadable as JSON.
    pub fn open(path: &Path) -> Self {
        let entries = fs::read_to_string(path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        Self {
            path: path.to_path_buf(),
            entries,
        }
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.entries)?)?;
        Ok(())
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        self.persist()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
}

/// Snapshot of the in-flight session, for resuming after a crash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub role: String,
    pub interview_type: InterviewType,
    pub duration_minutes: u64,
    pub status: SessionStatus,
    pub started_at_unix: u64,
}

/// One saved setup configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupRecord {
    pub role: String,
    pub interview_type: InterviewType,
    pub duration_minutes: u64,
    pub saved_at_unix: u64,
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Session-layer view over any `KvStore`: fixed keys, capped history.
pub struct SessionStore<S: KvStore> {
    store: S,
}

impl<S: KvStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn current_session(&self) -> Option<StoredSession> {
        // Corrupt blobs read as absent rather than erroring.
        self.store
            .get(CURRENT_SESSION_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }

    pub fn save_current_session(&mut self, session: &StoredSession) -> Result<(), StoreError> {
        self.store
            .set(CURRENT_SESSION_KEY, serde_json::to_string(session)?)
    }

    pub fn clear_current_session(&mut self) -> Result<(), StoreError> {
        self.store.remove(CURRENT_SESSION_KEY)
    }

    pub fn setup_history(&self) -> Vec<SetupRecord> {
        self.store
            .get(SETUP_HISTORY_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    pub fn last_setup(&self) -> Option<SetupRecord> {
        self.store
            .get(LAST_SETUP_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }

    /// Prepend a setup to the history (most recent first, capped) and track
    /// it as the last-used configuration.
    pub fn record_setup(&mut self, setup: &SetupRecord) -> Result<(), StoreError> {
        let mut history = self.setup_history();
        history.insert(0, setup.clone());
        history.truncate(HISTORY_CAP);
        self.store
            .set(SETUP_HISTORY_KEY, serde_json::to_string(&history)?)?;
        self.store.set(LAST_SETUP_KEY, serde_json::to_string(setup)?)
    }

    pub fn clear_all(&mut self) -> Result<(), StoreError> {
        self.store.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(role: &str, saved_at_unix: u64) -> SetupRecord {
        SetupRecord {
            role: role.to_string(),
            interview_type: InterviewType::Technical,
            duration_minutes: 5,
            saved_at_unix,
        }
    }

    #[test]
    fn memory_store_round_trips_values() {
        let mut store = MemoryStore::new();
        store.set("key", "value".to_string()).unwrap();
        assert_eq!(store.get("key").as_deref(), Some("value"));
        store.remove("key").unwrap();
        assert_eq!(store.get("key"), None);
    }

    #[test]
    fn current_session_round_trips() {
        let mut store = SessionStore::new(MemoryStore::new());
        assert!(store.current_session().is_none());

        let session = StoredSession {
            role: "Data Engineer".to_string(),
            interview_type: InterviewType::Full,
            duration_minutes: 10,
            status: SessionStatus::Active,
            started_at_unix: 1_700_000_000,
        };
        store.save_current_session(&session).unwrap();
        assert_eq!(store.current_session(), Some(session));

        store.clear_current_session().unwrap();
        assert!(store.current_session().is_none());
    }

    #[test]
    fn corrupt_session_blobs_read_as_absent() {
        let mut inner = MemoryStore::new();
        inner
            .set("currentSession", "{not json".to_string())
            .unwrap();
        let store = SessionStore::new(inner);
        assert!(store.current_session().is_none());
    }

    #[test]
    fn history_is_most_recent_first_and_capped_at_ten() {
        let mut store = SessionStore::new(MemoryStore::new());
        for i in 0..15u64 {
            store.record_setup(&setup(&format!("role-{i}"), i)).unwrap();
        }

        let history = store.setup_history();
        assert_eq!(history.len(), 10);
        assert_eq!(history[0].role, "role-14");
        assert_eq!(history[9].role, "role-5");
        assert_eq!(store.last_setup().unwrap().role, "role-14");
    }

    #[test]
    fn clear_all_empties_every_key() {
        let mut store = SessionStore::new(MemoryStore::new());
        store.record_setup(&setup("role", 1)).unwrap();
        store
            .save_current_session(&StoredSession {
                role: "role".to_string(),
                interview_type: InterviewType::Coding,
                duration_minutes: 5,
                status: SessionStatus::Active,
                started_at_unix: 1,
            })
            .unwrap();

        store.clear_all().unwrap();
        assert!(store.current_session().is_none());
        assert!(store.setup_history().is_empty());
        assert!(store.last_setup().is_none());
    }

    #[test]
    fn json_file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("store.json");

        {
            let mut store = SessionStore::new(JsonFileStore::open(&path));
            store.record_setup(&setup("persisted", 42)).unwrap();
        }

        let store = SessionStore::new(JsonFileStore::open(&path));
        assert_eq!(store.last_setup().unwrap().role, "persisted");
        assert_eq!(store.setup_history().len(), 1);
    }

    #[test]
    fn missing_store_files_start_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = JsonFileStore::open(&dir.path().join("absent.json"));
        assert!(store.get("anything").is_none());
    }
}
