//! File-backed config store
//!
//! Same record format as the extension's `chrome.storage.local` adapter,
//! persisted as one JSON file with whole-value-replace semantics.

use std::fs;
use std::path::PathBuf;

use hs_core::config::{Config, ConfigStore, StoreError};

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigStore for FileStore {
    fn load(&self) -> Result<Option<Config>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        let config = serde_json::from_str(&text)?;
        Ok(Some(config))
    }

    fn store(&self, config: &Config) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(config)
            .map_err(|err| StoreError::Malformed(err.to_string()))?;
        fs::write(&self.path, text).map_err(|err| StoreError::Unavailable(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hs_core::load_or_default;

    fn temp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("hs-cli-{}-{}.json", name, std::process::id()));
        path
    }

    #[test]
    fn test_missing_file_loads_as_none() {
        let store = FileStore::new(temp_path("missing"));
        assert!(store.load().unwrap().is_none());
        assert_eq!(load_or_default(&store).unwrap(), Config::default());
    }

    #[test]
    fn test_store_roundtrip() {
        let path = temp_path("roundtrip");
        let store = FileStore::new(&path);

        let mut config = Config::default();
        config.hide_domain("example.com");
        config.pin_domain("docs.rs");

        store.store(&config).unwrap();
        assert_eq!(store.load().unwrap(), Some(config));

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_garbage_file_is_malformed() {
        let path = temp_path("garbage");
        fs::write(&path, "not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Malformed(_))));

        fs::remove_file(path).unwrap();
    }
}
