use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

use super::error::{SettingsError, SettingsResult};
use super::schema::{SettingKey, SettingValue};

/// Routing flag carried alongside the patch fields in a request body
pub const TO_GLOBAL_FIELD: &str = "to_global";

/// A sparse settings update.
///
/// A key that is absent is left untouched. A key mapped to `None` was sent as
/// an explicit `null` and clears the option in the target scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    fields: BTreeMap<SettingKey, Option<Value>>,
}

/// Fields of a patch that all passed validation, ready to be written
pub type ValidatedPatch = Vec<(SettingKey, Option<SettingValue>)>;

impl SettingsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field; `Value::Null` is stored as an explicit clear
    pub fn with(mut self, key: SettingKey, value: Value) -> Self {
        let value = match value {
            Value::Null => None,
            other => Some(other),
        };
        self.fields.insert(key, value);
        self
    }

    pub fn clear(self, key: SettingKey) -> Self {
        self.with(key, Value::Null)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = SettingKey> + '_ {
        self.fields.keys().copied()
    }

    /// Split a request body into the patch and its `to_global` flag.
    ///
    /// Unknown keys are skipped. A missing `to_global` targets the project
    /// scope.
    pub fn from_request(body: Map<String, Value>) -> SettingsResult<(Self, bool)> {
        let mut patch = Self::new();
        let mut to_global = false;

        for (name, value) in body {
            if name == TO_GLOBAL_FIELD {
                to_global = match value {
                    Value::Bool(flag) => flag,
                    Value::Null => false,
                    _ => {
                        return Err(SettingsError::validation(
                            TO_GLOBAL_FIELD,
                            "expected a boolean",
                        ))
                    }
                };
                continue;
            }

            match SettingKey::parse(&name) {
                Some(key) => patch = patch.with(key, value),
                None => debug!("Ignoring unknown settings field '{}'", name),
            }
        }

        Ok((patch, to_global))
    }

    /// Validate every field. The first failure rejects the whole patch.
    pub fn validate(&self) -> SettingsResult<ValidatedPatch> {
        self.fields
            .iter()
            .map(|(key, value)| {
                let validated = value.as_ref().map(|v| key.validate(v)).transpose()?;
                Ok((*key, validated))
            })
            .collect()
    }
}
