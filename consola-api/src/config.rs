use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::verifier::DEFAULT_KEY_CHECK_TIMEOUT;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub cors: Option<CorsConfig>,
    pub settings: Option<SettingsConfig>,
    pub key_check: Option<KeyCheckConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SettingsConfig {
    /// Where the global settings document lives
    pub global_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct KeyCheckConfig {
    #[serde(default = "default_key_check_timeout_secs")]
    pub timeout_secs: u64,
    pub base_url: Option<String>,
    /// Models a key must have access to before it is accepted
    #[serde(default)]
    pub required_models: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LoggingConfig {
    /// Also write daily-rotated log files into this directory
    pub directory: Option<PathBuf>,
}

fn default_key_check_timeout_secs() -> u64 {
    DEFAULT_KEY_CHECK_TIMEOUT.as_secs()
}

impl Default for KeyCheckConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_key_check_timeout_secs(),
            base_url: None,
            required_models: Vec::new(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
            },
            cors: Some(CorsConfig {
                allowed_origins: vec!["http://localhost:3000".to_string()],
            }),
            settings: None,
            key_check: None,
            logging: None,
        }
    }
}

const DEFAULT_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 8000

[cors]
allowed_origins = ["http://localhost:3000"]

[settings]
# global_path = "~/.config/consola/settings.toml"

[key_check]
timeout_secs = 10
# base_url = "https://api.openai.com"
# required_models = ["gpt-4o"]

[logging]
# directory = "~/.local/share/consola/logs"
"#;

impl ApiConfig {
    /// Load the config file, writing a commented default one if it is missing
    pub fn load(path: Option<&Path>) -> Result<(Self, PathBuf), ConfigError> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);

        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        if !config_path.exists() {
            std::fs::write(&config_path, DEFAULT_CONFIG).map_err(|e| {
                ConfigError::Message(format!("Failed to write default config: {e}"))
            })?;
        }

        let builder = Config::builder()
            .add_source(File::from(config_path.clone()))
            .build()?;

        let mut config: ApiConfig = builder.try_deserialize()?;

        if let Some(settings) = config.settings.as_mut() {
            settings.global_path = settings.global_path.take().map(expand_tilde);
        }
        if let Some(logging) = config.logging.as_mut() {
            logging.directory = logging.directory.take().map(expand_tilde);
        }

        Ok((config, config_path))
    }

    pub fn global_settings_path(&self) -> PathBuf {
        self.settings
            .as_ref()
            .and_then(|s| s.global_path.clone())
            .unwrap_or_else(get_default_settings_path)
    }

    pub fn key_check(&self) -> KeyCheckConfig {
        self.key_check.clone().unwrap_or_default()
    }

    pub fn key_check_timeout(&self) -> Duration {
        Duration::from_secs(self.key_check().timeout_secs)
    }

    pub fn allowed_origins(&self) -> Vec<String> {
        self.cors
            .as_ref()
            .map(|c| c.allowed_origins.clone())
            .unwrap_or_default()
    }

    pub fn log_directory(&self) -> Option<PathBuf> {
        self.logging.as_ref().and_then(|l| l.directory.clone())
    }
}

/// Expand a leading `~` to the user's home directory
pub fn expand_tilde(path: PathBuf) -> PathBuf {
    if !path.starts_with("~") {
        return path;
    }
    match home::home_dir() {
        Some(home) => {
            let path_str = path.to_string_lossy();
            let expanded = path_str.replacen('~', &home.to_string_lossy(), 1);
            PathBuf::from(expanded)
        }
        None => path,
    }
}

fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("consola/api.toml")
    } else {
        PathBuf::from("api.toml")
    }
}

fn get_default_settings_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("consola/settings.toml")
    } else {
        PathBuf::from("settings.toml")
    }
}
