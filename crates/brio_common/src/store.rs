//! Per-user persistence for long-term memory and the week tracker.
//!
//! Layout under the data dir:
//!   <user>/memory.json
//!   <user>/week.json
//!
//! Writes go to a temp file that is renamed over the target, so a crash
//! never leaves a half-written document behind.

use crate::error::{BrioError, Result};
use crate::memory::LongTermMemory;
use crate::week::WeekState;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

const MEMORY_FILE: &str = "memory.json";
const WEEK_FILE: &str = "week.json";
const MAX_USER_ID_LEN: usize = 64;

/// Storage for everything that outlives a session
pub trait MemoryStore: Send + Sync {
    /// Missing memory loads as empty
    fn load_memory(&self, user: &str) -> Result<LongTermMemory>;
    fn save_memory(&self, user: &str, memory: &LongTermMemory) -> Result<()>;
    fn load_week(&self, user: &str) -> Result<Option<WeekState>>;
    fn save_week(&self, user: &str, week: &WeekState) -> Result<()>;
    fn clear_week(&self, user: &str) -> Result<()>;
}

/// User ids become directory names: ASCII letters, digits, `-` and `_`
pub fn validate_user(user: &str) -> Result<()> {
    let valid = !user.is_empty()
        && user.len() <= MAX_USER_ID_LEN
        && user
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(BrioError::InvalidUser(user.to_string()))
    }
}

/// JSON documents on disk, one directory per user
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn user_dir(&self, user: &str) -> Result<PathBuf> {
        validate_user(user)?;
        Ok(self.root.join(user))
    }

    fn read<T: DeserializeOwned>(&self, user: &str, file: &str) -> Result<Option<T>> {
        let path = self.user_dir(user)?.join(file);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let value = serde_json::from_str(&content)?;
        Ok(Some(value))
    }

    fn write<T: Serialize>(&self, user: &str, file: &str, value: &T) -> Result<()> {
        let dir = self.user_dir(user)?;
        fs::create_dir_all(&dir)?;

        let path = dir.join(file);
        let tmp = dir.join(format!("{file}.tmp"));
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;

        debug!(user, file, "saved");
        Ok(())
    }
}

impl MemoryStore for JsonFileStore {
    fn load_memory(&self, user: &str) -> Result<LongTermMemory> {
        Ok(self.read(user, MEMORY_FILE)?.unwrap_or_default())
    }

    fn save_memory(&self, user: &str, memory: &LongTermMemory) -> Result<()> {
        self.write(user, MEMORY_FILE, memory)
    }

    fn load_week(&self, user: &str) -> Result<Option<WeekState>> {
        self.read(user, WEEK_FILE)
    }

    fn save_week(&self, user: &str, week: &WeekState) -> Result<()> {
        self.write(user, WEEK_FILE, week)
    }

    fn clear_week(&self, user: &str) -> Result<()> {
        let path = self.user_dir(user)?.join(WEEK_FILE);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    memory: LongTermMemory,
    week: Option<WeekState>,
}

/// Process-local store, for tests and `--ephemeral` runs
#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: Mutex<HashMap<String, Slot>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_slot<T>(&self, user: &str, f: impl FnOnce(&mut Slot) -> T) -> Result<T> {
        validate_user(user)?;
        let mut users = self
            .users
            .lock()
            .map_err(|_| BrioError::Store("in-memory store lock poisoned".to_string()))?;
        Ok(f(users.entry(user.to_string()).or_default()))
    }
}

impl MemoryStore for InMemoryStore {
    fn load_memory(&self, user: &str) -> Result<LongTermMemory> {
        self.with_slot(user, |s| s.memory.clone())
    }

    fn save_memory(&self, user: &str, memory: &LongTermMemory) -> Result<()> {
        self.with_slot(user, |s| s.memory = memory.clone())
    }

    fn load_week(&self, user: &str) -> Result<Option<WeekState>> {
        self.with_slot(user, |s| s.week.clone())
    }

    fn save_week(&self, user: &str, week: &WeekState) -> Result<()> {
        self.with_slot(user, |s| s.week = Some(week.clone()))
    }

    fn clear_week(&self, user: &str) -> Result<()> {
        self.with_slot(user, |s| s.week = None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    #[test]
    fn test_validate_user() {
        assert!(validate_user("ana_01").is_ok());
        assert!(validate_user("a-b").is_ok());
        assert!(validate_user("").is_err());
        assert!(validate_user("../etc").is_err());
        assert!(validate_user("con espacio").is_err());
        assert!(validate_user(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_json_store_week_lifecycle() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert_eq!(store.load_week("ana").unwrap(), None);

        let now = Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap();
        let mut week = WeekState::start("Cómic", now);
        week.record_day(1, "guion de la primera página");
        store.save_week("ana", &week).unwrap();

        assert!(dir.path().join("ana").join(WEEK_FILE).exists());
        assert!(!dir.path().join("ana").join("week.json.tmp").exists());
        assert_eq!(store.load_week("ana").unwrap(), Some(week));

        store.clear_week("ana").unwrap();
        store.clear_week("ana").unwrap();
        assert_eq!(store.load_week("ana").unwrap(), None);
    }

    #[test]
    fn test_json_store_rejects_bad_user() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let err = store.load_memory("../x").unwrap_err();
        assert_eq!(err.kind(), "invalid_user");
    }

    #[test]
    fn test_corrupt_memory_is_an_error() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("ana")).unwrap();
        fs::write(dir.path().join("ana").join(MEMORY_FILE), "{not json").unwrap();
        let store = JsonFileStore::new(dir.path());
        assert_eq!(store.load_memory("ana").unwrap_err().kind(), "json");
    }

    #[test]
    fn test_in_memory_store_isolates_users() {
        let store = InMemoryStore::new();
        let mut memory = LongTermMemory::new();
        memory
            .stats
            .protocol_scores
            .insert("foco_25".to_string(), 2);
        store.save_memory("a", &memory).unwrap();
        assert_eq!(store.load_memory("a").unwrap(), memory);
        assert_eq!(store.load_memory("b").unwrap(), LongTermMemory::default());
    }
}
