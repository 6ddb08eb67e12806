use serde::{Deserialize, Serialize};
use shared_types::{AssetStatus, Settings, UserProfile};
use std::collections::BTreeMap;

use super::schema::{defaults, SettingKey, SettingValue};

/// The options one scope sets explicitly. Unset options are `None` (or
/// absent from the maps) and fall through to the next tier on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_autorun: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<UserProfile>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub agents: BTreeMap<String, AssetStatus>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub materials: BTreeMap<String, AssetStatus>,
}

impl SettingsDocument {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Write one validated field. `None` clears the field from this scope.
    pub fn set(&mut self, key: SettingKey, value: Option<SettingValue>) {
        match (key, value) {
            (SettingKey::Agents, None) => self.agents.clear(),
            (SettingKey::Materials, None) => self.materials.clear(),
            (SettingKey::Agents, Some(SettingValue::Assets(entries))) => {
                merge_assets(&mut self.agents, entries)
            }
            (SettingKey::Materials, Some(SettingValue::Assets(entries))) => {
                merge_assets(&mut self.materials, entries)
            }
            (SettingKey::OpenaiApiKey, value) => self.openai_api_key = text(value),
            (SettingKey::OpenaiBaseUrl, value) => self.openai_base_url = text(value),
            (SettingKey::DefaultModel, value) => self.default_model = text(value),
            (SettingKey::Temperature, value) => {
                self.temperature = match value {
                    Some(SettingValue::Number(n)) => Some(n),
                    _ => None,
                }
            }
            (SettingKey::CodeAutorun, value) => {
                self.code_autorun = match value {
                    Some(SettingValue::Flag(flag)) => Some(flag),
                    _ => None,
                }
            }
            (SettingKey::UserProfile, value) => {
                self.user_profile = match value {
                    Some(SettingValue::Profile(profile)) => Some(profile),
                    _ => None,
                }
            }
            // Validation pairs every key with its own value kind
            (SettingKey::Agents | SettingKey::Materials, Some(_)) => {}
        }
    }
}

fn text(value: Option<SettingValue>) -> Option<String> {
    match value {
        Some(SettingValue::Text(s)) => Some(s),
        _ => None,
    }
}

fn merge_assets(
    target: &mut BTreeMap<String, AssetStatus>,
    entries: BTreeMap<String, Option<AssetStatus>>,
) {
    for (id, status) in entries {
        match status {
            Some(status) => {
                target.insert(id, status);
            }
            None => {
                target.remove(&id);
            }
        }
    }
}

/// Resolve every option: project value, else global value, else default.
/// Map options are merged entry by entry with project entries winning.
pub fn merge(global: &SettingsDocument, project: Option<&SettingsDocument>) -> Settings {
    let base = defaults();
    let empty = SettingsDocument::default();
    let project = project.unwrap_or(&empty);

    let mut agents = global.agents.clone();
    agents.extend(project.agents.iter().map(|(k, v)| (k.clone(), *v)));
    let mut materials = global.materials.clone();
    materials.extend(project.materials.iter().map(|(k, v)| (k.clone(), *v)));

    Settings {
        openai_api_key: project
            .openai_api_key
            .clone()
            .or_else(|| global.openai_api_key.clone())
            .or(base.openai_api_key),
        openai_base_url: project
            .openai_base_url
            .clone()
            .or_else(|| global.openai_base_url.clone())
            .unwrap_or(base.openai_base_url),
        default_model: project
            .default_model
            .clone()
            .or_else(|| global.default_model.clone())
            .unwrap_or(base.default_model),
        temperature: project
            .temperature
            .or(global.temperature)
            .unwrap_or(base.temperature),
        code_autorun: project
            .code_autorun
            .or(global.code_autorun)
            .unwrap_or(base.code_autorun),
        user_profile: project
            .user_profile
            .clone()
            .or_else(|| global.user_profile.clone())
            .unwrap_or(base.user_profile),
        agents,
        materials,
    }
}
