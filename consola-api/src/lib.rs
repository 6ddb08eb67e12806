pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod settings;
pub mod verifier;

use consola_llm_sdk::key_check::{KeyValidator, OpenAIKeyValidator};
use consola_llm_sdk::LlmError;
use std::sync::Arc;

use crate::config::ApiConfig;
use crate::handlers::AppState;
use crate::settings::SettingsService;
use crate::verifier::KeyVerifier;

/// Build the upstream key validator described by the config
pub fn build_key_validator(config: &ApiConfig) -> Result<Arc<dyn KeyValidator>, LlmError> {
    let key_check = config.key_check();
    let mut validator = OpenAIKeyValidator::new(config.key_check_timeout())?
        .with_required_models(key_check.required_models);
    if let Some(base_url) = key_check.base_url {
        validator = validator.with_base_url(base_url);
    }
    Ok(Arc::new(validator))
}

/// Wire the settings service and key verifier into shared handler state
pub fn build_state(config: &ApiConfig, validator: Arc<dyn KeyValidator>) -> AppState {
    let settings = SettingsService::new(config.global_settings_path());
    let verifier = KeyVerifier::new(validator, config.key_check_timeout());
    AppState::new(settings, verifier)
}
