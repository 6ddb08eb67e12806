//! The fixed set of setting keys, their defaults and their value checks.

use serde_json::Value;
use shared_types::{AssetStatus, Settings, UserProfile};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use url::Url;

use super::error::{SettingsError, SettingsResult};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_TEMPERATURE: f64 = 0.2;

pub const SUPPORTED_MODELS: &[&str] = &[
    "gpt-4o",
    "gpt-4o-mini",
    "gpt-4-turbo",
    "gpt-4",
    "gpt-3.5-turbo",
];

pub const TEMPERATURE_RANGE: RangeInclusive<f64> = 0.0..=2.0;

const MAX_API_KEY_LEN: usize = 256;
const MAX_USERNAME_LEN: usize = 64;
const MAX_ASSET_ID_LEN: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SettingKey {
    OpenaiApiKey,
    OpenaiBaseUrl,
    DefaultModel,
    Temperature,
    CodeAutorun,
    UserProfile,
    Agents,
    Materials,
}

impl SettingKey {
    pub const ALL: [SettingKey; 8] = [
        SettingKey::OpenaiApiKey,
        SettingKey::OpenaiBaseUrl,
        SettingKey::DefaultModel,
        SettingKey::Temperature,
        SettingKey::CodeAutorun,
        SettingKey::UserProfile,
        SettingKey::Agents,
        SettingKey::Materials,
    ];

    /// Field name on the wire and in persisted documents
    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::OpenaiApiKey => "openai_api_key",
            SettingKey::OpenaiBaseUrl => "openai_base_url",
            SettingKey::DefaultModel => "default_model",
            SettingKey::Temperature => "temperature",
            SettingKey::CodeAutorun => "code_autorun",
            SettingKey::UserProfile => "user_profile",
            SettingKey::Agents => "agents",
            SettingKey::Materials => "materials",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }

    /// Check a raw JSON value against this key's type and constraints
    pub fn validate(self, value: &Value) -> SettingsResult<SettingValue> {
        let field = self.as_str();
        match self {
            SettingKey::OpenaiApiKey => validate_api_key(field, value).map(SettingValue::Text),
            SettingKey::OpenaiBaseUrl => validate_base_url(field, value).map(SettingValue::Text),
            SettingKey::DefaultModel => validate_model(field, value).map(SettingValue::Text),
            SettingKey::Temperature => {
                validate_temperature(field, value).map(SettingValue::Number)
            }
            SettingKey::CodeAutorun => value
                .as_bool()
                .map(SettingValue::Flag)
                .ok_or_else(|| type_mismatch(field, "a boolean", value)),
            SettingKey::UserProfile => {
                validate_user_profile(field, value).map(SettingValue::Profile)
            }
            SettingKey::Agents | SettingKey::Materials => {
                validate_assets(field, value).map(SettingValue::Assets)
            }
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value that passed validation for its key
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Text(String),
    Number(f64),
    Flag(bool),
    Profile(UserProfile),
    /// Sparse map update: `None` removes the entry
    Assets(BTreeMap<String, Option<AssetStatus>>),
}

/// Built-in values used when neither scope sets an option
pub fn defaults() -> Settings {
    Settings {
        openai_api_key: None,
        openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
        default_model: DEFAULT_MODEL.to_string(),
        temperature: DEFAULT_TEMPERATURE,
        code_autorun: false,
        user_profile: UserProfile::default(),
        agents: BTreeMap::new(),
        materials: BTreeMap::new(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn type_mismatch(field: &str, expected: &str, value: &Value) -> SettingsError {
    SettingsError::validation(
        field,
        format!("expected {}, got {}", expected, json_type_name(value)),
    )
}

fn expect_str<'a>(field: &str, value: &'a Value) -> SettingsResult<&'a str> {
    value
        .as_str()
        .ok_or_else(|| type_mismatch(field, "a string", value))
}

fn validate_api_key(field: &str, value: &Value) -> SettingsResult<String> {
    let key = expect_str(field, value)?;
    if key.is_empty() {
        return Err(SettingsError::validation(field, "must not be empty"));
    }
    if key.chars().any(char::is_whitespace) {
        return Err(SettingsError::validation(field, "must not contain whitespace"));
    }
    if key.chars().count() > MAX_API_KEY_LEN {
        return Err(SettingsError::validation(
            field,
            format!("must be at most {} characters", MAX_API_KEY_LEN),
        ));
    }
    Ok(key.to_string())
}

fn validate_base_url(field: &str, value: &Value) -> SettingsResult<String> {
    let raw = expect_str(field, value)?;
    let url = Url::parse(raw)
        .map_err(|e| SettingsError::validation(field, format!("not a valid URL: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(SettingsError::validation(
            field,
            format!("unsupported scheme '{}', expected http or https", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(SettingsError::validation(field, "URL must include a host"));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

fn validate_model(field: &str, value: &Value) -> SettingsResult<String> {
    let model = expect_str(field, value)?;
    if !SUPPORTED_MODELS.contains(&model) {
        return Err(SettingsError::validation(
            field,
            format!(
                "unknown model '{}', expected one of: {}",
                model,
                SUPPORTED_MODELS.join(", ")
            ),
        ));
    }
    Ok(model.to_string())
}

fn validate_temperature(field: &str, value: &Value) -> SettingsResult<f64> {
    let temperature = value
        .as_f64()
        .ok_or_else(|| type_mismatch(field, "a number", value))?;
    if !temperature.is_finite() || !TEMPERATURE_RANGE.contains(&temperature) {
        return Err(SettingsError::validation(
            field,
            format!(
                "must be between {} and {}",
                TEMPERATURE_RANGE.start(),
                TEMPERATURE_RANGE.end()
            ),
        ));
    }
    Ok(temperature)
}

fn validate_user_profile(field: &str, value: &Value) -> SettingsResult<UserProfile> {
    let object = value
        .as_object()
        .ok_or_else(|| type_mismatch(field, "an object", value))?;

    let username_field = format!("{}.username", field);
    let username = match object.get("username") {
        Some(username) => expect_str(&username_field, username)?.trim(),
        None => return Err(SettingsError::validation(username_field, "is required")),
    };
    if username.is_empty() {
        return Err(SettingsError::validation(username_field, "must not be empty"));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(SettingsError::validation(
            username_field,
            format!("must be at most {} characters", MAX_USERNAME_LEN),
        ));
    }

    let email_field = format!("{}.email", field);
    let email = match object.get("email") {
        None | Some(Value::Null) => None,
        Some(email) => {
            let email = expect_str(&email_field, email)?.trim();
            if !is_plausible_email(email) {
                return Err(SettingsError::validation(
                    email_field,
                    format!("'{}' is not an email address", email),
                ));
            }
            Some(email.to_string())
        }
    };

    Ok(UserProfile {
        username: username.to_string(),
        email,
    })
}

fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

fn validate_assets(
    field: &str,
    value: &Value,
) -> SettingsResult<BTreeMap<String, Option<AssetStatus>>> {
    let object = value
        .as_object()
        .ok_or_else(|| type_mismatch(field, "an object", value))?;

    let mut entries = BTreeMap::new();
    for (id, status) in object {
        let entry_field = format!("{}.{}", field, id);
        if id.is_empty() || id.len() > MAX_ASSET_ID_LEN {
            return Err(SettingsError::validation(
                entry_field,
                format!("id must be 1 to {} characters", MAX_ASSET_ID_LEN),
            ));
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            return Err(SettingsError::validation(
                entry_field,
                "id may only contain letters, digits, '_', '-' and '.'",
            ));
        }

        let status = match status {
            Value::Null => None,
            Value::String(raw) => Some(AssetStatus::parse(raw).ok_or_else(|| {
                SettingsError::validation(
                    &entry_field,
                    format!("unknown status '{}', expected enabled, disabled or forced", raw),
                )
            })?),
            other => return Err(type_mismatch(&entry_field, "a status string", other)),
        };
        entries.insert(id.clone(), status);
    }

    Ok(entries)
}
