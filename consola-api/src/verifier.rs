use consola_llm_sdk::key_check::KeyValidator;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_KEY_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCheck {
    Valid,
    Invalid,
}

impl KeyCheck {
    pub fn is_valid(self) -> bool {
        self == KeyCheck::Valid
    }
}

/// Checks API keys against the upstream provider.
///
/// Never fails: a provider error, a timeout or a panic inside the validator
/// all come back as [`KeyCheck::Invalid`].
#[derive(Clone)]
pub struct KeyVerifier {
    validator: Arc<dyn KeyValidator>,
    timeout: Duration,
}

impl KeyVerifier {
    pub fn new(validator: Arc<dyn KeyValidator>, timeout: Duration) -> Self {
        Self { validator, timeout }
    }

    pub async fn verify(&self, candidate: &str) -> KeyCheck {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            debug!("Empty API key, skipping upstream check");
            return KeyCheck::Invalid;
        }

        let validator = self.validator.clone();
        let key = candidate.to_string();
        let mut task = tokio::spawn(async move { validator.validate(&key).await });

        match tokio::time::timeout(self.timeout, &mut task).await {
            Ok(Ok(Ok(true))) => KeyCheck::Valid,
            Ok(Ok(Ok(false))) => KeyCheck::Invalid,
            Ok(Ok(Err(e))) => {
                warn!(
                    provider = self.validator.provider_name(),
                    "API key check failed upstream: {}", e
                );
                KeyCheck::Invalid
            }
            Ok(Err(join_error)) => {
                warn!(
                    provider = self.validator.provider_name(),
                    "API key check aborted: {}", join_error
                );
                KeyCheck::Invalid
            }
            Err(_) => {
                task.abort();
                warn!(
                    provider = self.validator.provider_name(),
                    "API key check timed out after {:?}", self.timeout
                );
                KeyCheck::Invalid
            }
        }
    }
}
