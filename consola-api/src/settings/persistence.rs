use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::document::SettingsDocument;
use super::error::{SettingsError, SettingsResult};

/// Directory inside a project root that holds its settings
pub const PROJECT_SETTINGS_DIR: &str = ".consola";
pub const SETTINGS_FILE_NAME: &str = "settings.toml";

pub fn project_settings_path(project_root: &Path) -> PathBuf {
    project_root
        .join(PROJECT_SETTINGS_DIR)
        .join(SETTINGS_FILE_NAME)
}

/// Read a scope document. Never fails: a missing file is an empty document,
/// and an unreadable or corrupt one is logged and treated as empty.
pub fn load_document(path: &Path) -> SettingsDocument {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No settings file at {}, starting empty", path.display());
            return SettingsDocument::default();
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Failed to read settings file, using empty settings"
            );
            return SettingsDocument::default();
        }
    };

    match toml::from_str::<SettingsDocument>(&contents) {
        Ok(document) => document,
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Settings file is corrupt, using empty settings"
            );
            SettingsDocument::default()
        }
    }
}

/// Write a scope document as a whole. The new contents go to a temporary
/// file next to the target which is then renamed over it, so readers see
/// either the old or the new document.
pub fn save_document(path: &Path, document: &SettingsDocument) -> SettingsResult<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    std::fs::create_dir_all(parent).map_err(|e| SettingsError::persistence(path, e))?;

    let contents = toml::to_string_pretty(document)?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| SettingsError::persistence(path, e))?;
    temp.write_all(contents.as_bytes())
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| SettingsError::persistence(path, e))?;
    temp.persist(path)
        .map_err(|e| SettingsError::persistence(path, e.error))?;

    debug!("Saved settings to {}", path.display());
    Ok(())
}
