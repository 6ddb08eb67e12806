use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

/// Activation state of an agent or material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum AssetStatus {
    Enabled,
    Disabled,
    /// Always included, regardless of relevance
    Forced,
}

impl AssetStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "enabled" => Some(Self::Enabled),
            "disabled" => Some(Self::Disabled),
            "forced" => Some(Self::Forced),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserProfile {
    pub username: String,
    pub email: Option<String>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            username: "user".to_string(),
            email: None,
        }
    }
}

/// Effective settings: project values over global values over defaults.
///
/// Every field is always present. `openai_api_key` is `null` only when no
/// scope has a key configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Settings {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub default_model: String,
    pub temperature: f64,
    pub code_autorun: bool,
    pub user_profile: UserProfile,
    pub agents: BTreeMap<String, AssetStatus>,
    pub materials: BTreeMap<String, AssetStatus>,
}
