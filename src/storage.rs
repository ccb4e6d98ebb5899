//! Progress persistence: the saved record and the key-value stores it lives in.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::PathBuf;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::entities::Upgrades;
use crate::error::Result;

/// Key the progress record is stored under.
pub const PROGRESS_KEY: &str = "safe_voyage_progress";

/// Everything that survives between sessions. Missing fields load as zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SaveData {
    pub current_level_index: usize,
    pub score: i64,
    pub coins: u32,
    pub upgrades: Upgrades,
}

impl SaveData {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Synchronous string key-value storage.
pub trait ProgressStore: Debug {
    /// `Ok(None)` when nothing was ever written under `key`.
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl ProgressStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// In-memory store. Clones share the same map, so a test can keep a handle
/// while a `GameState` owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

impl ProgressStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.insert(key, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_to_zero() {
        let data = SaveData::from_json(r#"{"coins": 120}"#).unwrap();
        assert_eq!(data.coins, 120);
        assert_eq!(data.score, 0);
        assert_eq!(data.current_level_index, 0);
        assert_eq!(data.upgrades, Upgrades::default());
    }

    #[test]
    fn partial_upgrades_default_the_rest() {
        let data = SaveData::from_json(r#"{"upgrades": {"whistle": 2}}"#).unwrap();
        assert_eq!(data.upgrades.whistle, 2);
        assert_eq!(data.upgrades.speed, 0);
    }

    #[test]
    fn uses_camel_case_field_names() {
        let data = SaveData {
            current_level_index: 3,
            ..SaveData::default()
        };
        let json = data.to_json().unwrap();
        assert!(json.contains("\"currentLevelIndex\":3"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(SaveData::from_json("{not json").is_err());
        assert!(SaveData::from_json(r#"{"coins": -5}"#).is_err());
    }

    #[test]
    fn file_store_reads_back_what_it_wrote() {
        let dir = std::env::temp_dir().join(format!("safe_voyage_store_{}", std::process::id()));
        let mut store = FileStore::new(&dir);
        assert_eq!(store.read("probe").unwrap(), None);
        store.write("probe", "{}").unwrap();
        assert_eq!(store.read("probe").unwrap().as_deref(), Some("{}"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn memory_store_clones_share_entries() {
        let a = MemoryStore::new();
        let mut b = a.clone();
        b.write("k", "v").unwrap();
        assert_eq!(a.get("k").as_deref(), Some("v"));
    }
}
