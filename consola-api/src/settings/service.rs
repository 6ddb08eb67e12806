use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::error::{SettingsError, SettingsResult};
use super::store::SettingsStore;

/// Shared access point to the settings store.
///
/// Built once by the composition root and handed to every request handler.
/// The store is loaded from disk on first use and reused afterwards.
#[derive(Debug)]
pub struct SettingsService {
    global_path: PathBuf,
    store: Mutex<Option<Arc<SettingsStore>>>,
}

impl SettingsService {
    pub fn new(global_path: impl Into<PathBuf>) -> Self {
        Self {
            global_path: global_path.into(),
            store: Mutex::new(None),
        }
    }

    /// The process-wide store, loading it on first access
    pub fn current(&self) -> SettingsResult<Arc<SettingsStore>> {
        let mut slot = self
            .store
            .lock()
            .map_err(|e| SettingsError::LockPoisoned(e.to_string()))?;

        if let Some(store) = slot.as_ref() {
            return Ok(store.clone());
        }

        debug!("Initializing settings store");
        let store = Arc::new(SettingsStore::load(&self.global_path));
        *slot = Some(store.clone());
        Ok(store)
    }

    /// Forget the loaded store; the next access reloads from disk
    pub fn reset(&self) {
        match self.store.lock() {
            Ok(mut slot) => *slot = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.store
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::patch::SettingsPatch;
    use crate::settings::schema::SettingKey;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_store_is_loaded_lazily() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        let service = SettingsService::new(&path);

        assert!(!service.is_loaded());
        assert!(!path.exists());

        service.current().unwrap();
        assert!(service.is_loaded());
        assert!(path.exists());
    }

    #[test]
    fn test_current_returns_same_instance() {
        let dir = TempDir::new().unwrap();
        let service = SettingsService::new(dir.path().join("settings.toml"));

        let first = service.current().unwrap();
        let second = service.current().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_reset_reloads_from_disk() {
        let dir = TempDir::new().unwrap();
        let service = SettingsService::new(dir.path().join("settings.toml"));

        let first = service.current().unwrap();
        first
            .apply(
                &SettingsPatch::new().with(SettingKey::CodeAutorun, json!(true)),
                true,
            )
            .unwrap();

        service.reset();
        assert!(!service.is_loaded());

        let second = service.current().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(second.get_merged().unwrap().code_autorun);
    }
}
