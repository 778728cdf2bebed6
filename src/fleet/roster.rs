//! Roster persistence: the `RosterStore` port plus a JSON file-backed
//! adapter, split the way the teacher separates `RepositoryProvider` (the
//! contract the domain depends on) from `SeaOrmRepositoryProvider` (the
//! concrete storage technology).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::charger::config::ChargerConfig;
use crate::fleet::error::AdminError;

/// Loads and persists the full charger roster. Implementations only need
/// to guarantee that a completed `save` is durable and atomic; `FleetManager`
/// calls `save` after every roster mutation.
pub trait RosterStore: Send + Sync {
    fn load(&self) -> Result<Vec<ChargerConfig>, AdminError>;
    fn save(&self, chargers: &[ChargerConfig]) -> Result<(), AdminError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct RosterFile {
    chargers: Vec<ChargerConfig>,
}

/// Stores the roster as a single JSON file, rewritten atomically via
/// write-to-temp-then-rename so a crash mid-write never corrupts the
/// previous roster.
pub struct JsonFileRosterStore {
    path: PathBuf,
}

impl JsonFileRosterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| std::ffi::OsString::from("roster.json"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl RosterStore for JsonFileRosterStore {
    fn load(&self) -> Result<Vec<ChargerConfig>, AdminError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => {
                let file: RosterFile = serde_json::from_str(&text)
                    .map_err(|e| AdminError::InvalidArgument(format!("malformed roster file: {e}")))?;
                Ok(file.chargers)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(AdminError::InvalidArgument(format!("roster read failed: {e}"))),
        }
    }

    fn save(&self, chargers: &[ChargerConfig]) -> Result<(), AdminError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| AdminError::InvalidArgument(format!("roster dir create failed: {e}")))?;
            }
        }
        let file = RosterFile {
            chargers: chargers.to_vec(),
        };
        let text = serde_json::to_string_pretty(&file)
            .map_err(|e| AdminError::InvalidArgument(format!("roster serialize failed: {e}")))?;
        let tmp = self.tmp_path();
        std::fs::write(&tmp, text).map_err(|e| AdminError::InvalidArgument(format!("roster write failed: {e}")))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| AdminError::InvalidArgument(format!("roster rename failed: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vcpsim-roster-test-{name}-{}.json", std::process::id()))
    }

    #[test]
    fn missing_file_loads_empty_roster() {
        let store = JsonFileRosterStore::new(temp_path("missing"));
        let chargers = store.load().unwrap();
        assert!(chargers.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let path = temp_path("roundtrip");
        let store = JsonFileRosterStore::new(&path);
        let config = ChargerConfig::new("CP-1", "Acme", "X1");
        store.save(std::slice::from_ref(&config)).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].cp_id, "CP-1");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let path = temp_path("notemp");
        let store = JsonFileRosterStore::new(&path);
        store.save(&[]).unwrap();
        assert!(!Path::new(&store.tmp_path()).exists());
        let _ = std::fs::remove_file(&path);
    }
}
