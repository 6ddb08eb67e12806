use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    /// A patch field failed its type or range check
    #[error("Invalid value for '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// A project-scoped write arrived while no project is open
    #[error("No project is open, project settings are unavailable")]
    ScopeUnavailable,

    #[error("Project directory not found: {}", .0.display())]
    ProjectNotFound(PathBuf),

    #[error("Failed to persist settings to {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Settings lock poisoned: {0}")]
    LockPoisoned(String),
}

impl SettingsError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }
}

pub type SettingsResult<T> = Result<T, SettingsError>;
