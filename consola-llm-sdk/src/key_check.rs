use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::{
    error::LlmError,
    openai::{client::DEFAULT_BASE_URL, OpenAIClient},
};

/// Checks a candidate API key against an upstream provider.
///
/// `Ok(false)` means the provider answered and rejected the key. `Err` means
/// the provider could not give an answer (network, rate limit, 5xx).
#[async_trait]
pub trait KeyValidator: Send + Sync {
    async fn validate(&self, key: &str) -> Result<bool, LlmError>;

    /// Get provider name (e.g., "openai")
    fn provider_name(&self) -> &str;
}

/// Validates OpenAI keys by listing the models they can access
pub struct OpenAIKeyValidator {
    base_url: String,
    required_models: Vec<String>,
    http_client: reqwest::Client,
}

impl OpenAIKeyValidator {
    pub fn new(timeout: Duration) -> Result<Self, LlmError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Network { source: e })?;

        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            required_models: Vec::new(),
            http_client,
        })
    }

    /// Set a custom base URL for the API
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Models the key must be able to access to count as valid
    pub fn with_required_models(mut self, models: Vec<String>) -> Self {
        self.required_models = models;
        self
    }
}

#[async_trait]
impl KeyValidator for OpenAIKeyValidator {
    async fn validate(&self, key: &str) -> Result<bool, LlmError> {
        let client = match OpenAIClient::with_http_client(key, self.http_client.clone()) {
            Ok(client) => client.with_base_url(self.base_url.clone()),
            Err(e) if e.is_authentication() => return Ok(false),
            Err(e) => return Err(e),
        };

        let models = match client.list_models().await {
            Ok(models) => models,
            Err(e) if e.is_authentication() => {
                debug!("Key rejected by {}: {}", self.provider_name(), e);
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let missing: Vec<&str> = self
            .required_models
            .iter()
            .filter(|model| !models.contains(model.as_str()))
            .map(String::as_str)
            .collect();

        if !missing.is_empty() {
            debug!("Key lacks access to required models: {:?}", missing);
            return Ok(false);
        }

        Ok(true)
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}
