use shared_types::Settings;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

use super::document::{merge, SettingsDocument};
use super::error::{SettingsError, SettingsResult};
use super::patch::{SettingsPatch, ValidatedPatch};
use super::persistence::{load_document, project_settings_path, save_document};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsScope {
    Global,
    Project,
}

impl SettingsScope {
    pub fn from_to_global(to_global: bool) -> Self {
        if to_global {
            SettingsScope::Global
        } else {
            SettingsScope::Project
        }
    }
}

#[derive(Debug)]
struct GlobalScope {
    path: PathBuf,
    document: SettingsDocument,
}

#[derive(Debug)]
struct ProjectScope {
    root: PathBuf,
    path: PathBuf,
    document: SettingsDocument,
}

/// Owns the global and project settings documents.
///
/// Lock order is always global before project.
#[derive(Debug)]
pub struct SettingsStore {
    global: RwLock<GlobalScope>,
    project: RwLock<Option<ProjectScope>>,
}

impl SettingsStore {
    /// Load the global document, creating an empty one on first start
    pub fn load(global_path: impl Into<PathBuf>) -> Self {
        let path = global_path.into();

        if !path.exists() {
            match save_document(&path, &SettingsDocument::default()) {
                Ok(()) => info!("Created global settings at {}", path.display()),
                Err(e) => warn!("Could not create global settings file: {}", e),
            }
        }

        let document = load_document(&path);
        info!("Loaded global settings from {}", path.display());

        Self {
            global: RwLock::new(GlobalScope { path, document }),
            project: RwLock::new(None),
        }
    }

    /// The effective settings across both scopes
    pub fn get_merged(&self) -> SettingsResult<Settings> {
        let global = read(&self.global)?;
        let project = read(&self.project)?;
        Ok(merge(
            &global.document,
            project.as_ref().map(|scope| &scope.document),
        ))
    }

    /// Validate `patch` and commit it to one scope.
    ///
    /// Nothing is written unless every field is valid. The scope document is
    /// persisted before the in-memory copy is replaced, so a failed write
    /// leaves the scope as it was.
    pub fn apply(&self, patch: &SettingsPatch, to_global: bool) -> SettingsResult<()> {
        let validated = patch.validate()?;
        if validated.is_empty() {
            debug!("Settings patch has no recognised fields, nothing to do");
            return Ok(());
        }

        match SettingsScope::from_to_global(to_global) {
            SettingsScope::Global => {
                let mut global = write(&self.global)?;
                let next = patched(&global.document, validated);
                save_document(&global.path, &next)?;
                global.document = next;
                info!("Updated global settings ({} fields)", patch.len());
            }
            SettingsScope::Project => {
                let mut project = write(&self.project)?;
                let scope = project.as_mut().ok_or(SettingsError::ScopeUnavailable)?;
                let next = patched(&scope.document, validated);
                save_document(&scope.path, &next)?;
                scope.document = next;
                info!(
                    "Updated project settings for {} ({} fields)",
                    scope.root.display(),
                    patch.len()
                );
            }
        }

        Ok(())
    }

    /// Make `root` the active project, replacing any open one
    pub fn open_project(&self, root: &Path) -> SettingsResult<PathBuf> {
        if !root.is_dir() {
            return Err(SettingsError::ProjectNotFound(root.to_path_buf()));
        }
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        let path = project_settings_path(&root);
        let document = load_document(&path);

        let mut project = write(&self.project)?;
        if let Some(previous) = project.as_ref() {
            info!("Closing project {}", previous.root.display());
        }
        *project = Some(ProjectScope {
            root: root.clone(),
            path,
            document,
        });
        info!("Opened project {}", root.display());

        Ok(root)
    }

    /// Drop the project scope. Its values are not carried into global.
    pub fn close_project(&self) -> SettingsResult<Option<PathBuf>> {
        let mut project = write(&self.project)?;
        let closed = project.take().map(|scope| scope.root);
        match &closed {
            Some(root) => info!("Closed project {}", root.display()),
            None => debug!("No project open, nothing to close"),
        }
        Ok(closed)
    }

    pub fn active_project(&self) -> SettingsResult<Option<PathBuf>> {
        Ok(read(&self.project)?.as_ref().map(|scope| scope.root.clone()))
    }

    pub fn global_path(&self) -> SettingsResult<PathBuf> {
        Ok(read(&self.global)?.path.clone())
    }
}

fn patched(document: &SettingsDocument, validated: ValidatedPatch) -> SettingsDocument {
    let mut next = document.clone();
    for (key, value) in validated {
        next.set(key, value);
    }
    next
}

fn read<T>(lock: &RwLock<T>) -> SettingsResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|e| SettingsError::LockPoisoned(e.to_string()))
}

fn write<T>(lock: &RwLock<T>) -> SettingsResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|e| SettingsError::LockPoisoned(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::schema::{defaults, SettingKey};
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        global_path: PathBuf,
        project_root: PathBuf,
        store: SettingsStore,
    }

    fn entry(id: String, status: &str) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert(id, json!(status));
        serde_json::Value::Object(map)
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let global_path = dir.path().join("config").join("settings.toml");
        let project_root = dir.path().join("project");
        std::fs::create_dir_all(&project_root).unwrap();
        let store = SettingsStore::load(&global_path);
        Fixture {
            _dir: dir,
            global_path,
            project_root,
            store,
        }
    }

    #[test]
    fn test_first_start_returns_defaults_and_creates_file() {
        let f = fixture();
        assert_eq!(f.store.get_merged().unwrap(), defaults());
        assert!(f.global_path.exists());
        assert_eq!(f.store.global_path().unwrap(), f.global_path);
    }

    #[test]
    fn test_global_apply_is_visible_and_persisted() {
        let f = fixture();
        let patch = SettingsPatch::new()
            .with(SettingKey::DefaultModel, json!("gpt-4"))
            .with(SettingKey::CodeAutorun, json!(true));

        f.store.apply(&patch, true).unwrap();

        let merged = f.store.get_merged().unwrap();
        assert_eq!(merged.default_model, "gpt-4");
        assert!(merged.code_autorun);
        assert_eq!(merged.temperature, defaults().temperature);

        let reloaded = SettingsStore::load(&f.global_path);
        assert_eq!(reloaded.get_merged().unwrap(), merged);
    }

    #[test]
    fn test_fields_absent_from_patch_are_unchanged() {
        let f = fixture();
        f.store
            .apply(
                &SettingsPatch::new().with(SettingKey::Temperature, json!(1.5)),
                true,
            )
            .unwrap();
        let before = f.store.get_merged().unwrap();

        f.store
            .apply(
                &SettingsPatch::new().with(SettingKey::DefaultModel, json!("gpt-4o-mini")),
                true,
            )
            .unwrap();
        let after = f.store.get_merged().unwrap();

        assert_eq!(after.temperature, 1.5);
        assert_eq!(after.default_model, "gpt-4o-mini");
        assert_eq!(
            Settings {
                default_model: before.default_model.clone(),
                ..after
            },
            before
        );
    }

    #[test]
    fn test_empty_patch_is_noop() {
        let f = fixture();
        let before = f.store.get_merged().unwrap();
        let bytes_before = std::fs::read(&f.global_path).unwrap();

        f.store.apply(&SettingsPatch::new(), true).unwrap();
        f.store.apply(&SettingsPatch::new(), false).unwrap();

        assert_eq!(f.store.get_merged().unwrap(), before);
        assert_eq!(std::fs::read(&f.global_path).unwrap(), bytes_before);
    }

    #[test]
    fn test_invalid_patch_changes_nothing() {
        let f = fixture();
        f.store.open_project(&f.project_root).unwrap();
        f.store
            .apply(
                &SettingsPatch::new().with(SettingKey::CodeAutorun, json!(true)),
                true,
            )
            .unwrap();
        f.store
            .apply(
                &SettingsPatch::new().with(SettingKey::DefaultModel, json!("gpt-4")),
                false,
            )
            .unwrap();

        let project_path = project_settings_path(&f.project_root);
        let global_bytes = std::fs::read(&f.global_path).unwrap();
        let project_bytes = std::fs::read(&project_path).unwrap();
        let before = f.store.get_merged().unwrap();

        let bad = SettingsPatch::new()
            .with(SettingKey::CodeAutorun, json!(false))
            .with(SettingKey::Temperature, json!(42));
        for to_global in [true, false] {
            let err = f.store.apply(&bad, to_global).unwrap_err();
            assert!(matches!(err, SettingsError::Validation { .. }));
        }

        assert_eq!(f.store.get_merged().unwrap(), before);
        assert_eq!(std::fs::read(&f.global_path).unwrap(), global_bytes);
        assert_eq!(std::fs::read(&project_path).unwrap(), project_bytes);
    }

    #[test]
    fn test_project_write_without_project_fails() {
        let f = fixture();
        let patch = SettingsPatch::new().with(SettingKey::CodeAutorun, json!(true));
        let err = f.store.apply(&patch, false).unwrap_err();
        assert!(matches!(err, SettingsError::ScopeUnavailable));
        assert!(!f.store.get_merged().unwrap().code_autorun);
    }

    #[test]
    fn test_project_overrides_and_close_discards() {
        let f = fixture();
        f.store
            .apply(
                &SettingsPatch::new().with(SettingKey::DefaultModel, json!("gpt-4")),
                true,
            )
            .unwrap();
        f.store.open_project(&f.project_root).unwrap();
        f.store
            .apply(
                &SettingsPatch::new().with(SettingKey::DefaultModel, json!("gpt-4o-mini")),
                false,
            )
            .unwrap();
        assert_eq!(f.store.get_merged().unwrap().default_model, "gpt-4o-mini");

        let closed = f.store.close_project().unwrap();
        assert!(closed.is_some());
        assert_eq!(f.store.active_project().unwrap(), None);
        assert_eq!(f.store.get_merged().unwrap().default_model, "gpt-4");

        // Project values never reach the global file
        let global = load_document(&f.global_path);
        assert_eq!(global.default_model.as_deref(), Some("gpt-4"));
    }

    #[test]
    fn test_reopening_project_restores_its_settings() {
        let f = fixture();
        f.store.open_project(&f.project_root).unwrap();
        f.store
            .apply(
                &SettingsPatch::new().with(SettingKey::Temperature, json!(0.9)),
                false,
            )
            .unwrap();
        f.store.close_project().unwrap();
        assert_eq!(f.store.get_merged().unwrap().temperature, defaults().temperature);

        f.store.open_project(&f.project_root).unwrap();
        assert_eq!(f.store.get_merged().unwrap().temperature, 0.9);
    }

    #[test]
    fn test_clearing_project_field_falls_back_to_global() {
        let f = fixture();
        f.store
            .apply(
                &SettingsPatch::new().with(SettingKey::Temperature, json!(1.0)),
                true,
            )
            .unwrap();
        f.store.open_project(&f.project_root).unwrap();
        f.store
            .apply(
                &SettingsPatch::new().with(SettingKey::Temperature, json!(0.1)),
                false,
            )
            .unwrap();
        assert_eq!(f.store.get_merged().unwrap().temperature, 0.1);

        f.store
            .apply(&SettingsPatch::new().clear(SettingKey::Temperature), false)
            .unwrap();
        assert_eq!(f.store.get_merged().unwrap().temperature, 1.0);
    }

    #[test]
    fn test_open_missing_project_fails() {
        let f = fixture();
        let err = f
            .store
            .open_project(&f.project_root.join("missing"))
            .unwrap_err();
        assert!(matches!(err, SettingsError::ProjectNotFound(_)));
        assert_eq!(f.store.active_project().unwrap(), None);
    }

    #[test]
    fn test_corrupt_global_file_degrades_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();

        let store = SettingsStore::load(&path);
        assert_eq!(store.get_merged().unwrap(), defaults());
    }

    #[test]
    fn test_failed_persist_keeps_previous_state() {
        let f = fixture();
        f.store.open_project(&f.project_root).unwrap();

        // Replace the settings directory with a plain file so the write fails
        let settings_dir = f.project_root.join(".consola");
        let _ = std::fs::remove_dir_all(&settings_dir);
        std::fs::write(&settings_dir, "blocked").unwrap();

        let patch = SettingsPatch::new().with(SettingKey::CodeAutorun, json!(true));
        let err = f.store.apply(&patch, false).unwrap_err();
        assert!(matches!(err, SettingsError::Persistence { .. }));
        assert!(!f.store.get_merged().unwrap().code_autorun);
    }

    #[test]
    fn test_concurrent_disjoint_applies_are_not_lost() {
        let f = fixture();
        let store = Arc::new(f.store);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    let patch = if i % 2 == 0 {
                        SettingsPatch::new()
                            .with(SettingKey::Agents, entry(format!("agent-{i}"), "enabled"))
                    } else {
                        SettingsPatch::new().with(
                            SettingKey::Materials,
                            entry(format!("material-{i}"), "forced"),
                        )
                    };
                    store.apply(&patch, true).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let merged = store.get_merged().unwrap();
        assert_eq!(merged.agents.len(), 4);
        assert_eq!(merged.materials.len(), 4);

        let persisted = load_document(&f.global_path);
        assert_eq!(persisted.agents.len(), 4);
        assert_eq!(persisted.materials.len(), 4);
    }

    #[test]
    fn test_concurrent_scalar_applies_both_land() {
        let f = fixture();
        let store = Arc::new(f.store);

        let a = {
            let store = store.clone();
            std::thread::spawn(move || {
                store
                    .apply(
                        &SettingsPatch::new().with(SettingKey::Temperature, json!(1)),
                        true,
                    )
                    .unwrap()
            })
        };
        let b = {
            let store = store.clone();
            std::thread::spawn(move || {
                store
                    .apply(
                        &SettingsPatch::new().with(SettingKey::CodeAutorun, json!(true)),
                        true,
                    )
                    .unwrap()
            })
        };
        a.join().unwrap();
        b.join().unwrap();

        let merged = store.get_merged().unwrap();
        assert_eq!(merged.temperature, 1.0);
        assert!(merged.code_autorun);
    }
}
