use actix_web::{test, web, App};
use async_trait::async_trait;
use consola_api::handlers::{configure_routes, AppState};
use consola_api::settings::SettingsService;
use consola_api::verifier::KeyVerifier;
use consola_llm_sdk::error::LlmError;
use consola_llm_sdk::key_check::KeyValidator;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// The only key the mock provider accepts
pub const VALID_KEY: &str = "sk-test-valid";

pub struct TestApp<S> {
    /// Holds the global settings file; removed on drop
    pub config_dir: TempDir,
    pub global_path: PathBuf,
    pub validator: Arc<MockKeyValidator>,
    pub state: web::Data<AppState>,
    pub app: S,
}

#[derive(Default)]
pub struct MockKeyValidator {
    pub call_count: AtomicUsize,
}

impl MockKeyValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValidator for MockKeyValidator {
    async fn validate(&self, key: &str) -> Result<bool, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(key == VALID_KEY)
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

pub async fn setup_test_app() -> anyhow::Result<
    TestApp<
        impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
    >,
> {
    let config_dir = TempDir::new()?;
    let global_path = config_dir.path().join("consola").join("settings.toml");
    let validator = Arc::new(MockKeyValidator::new());

    let verifier = KeyVerifier::new(
        validator.clone() as Arc<dyn KeyValidator>,
        Duration::from_secs(2),
    );
    let state = web::Data::new(AppState::new(
        SettingsService::new(global_path.clone()),
        verifier,
    ));

    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(configure_routes),
    )
    .await;

    Ok(TestApp {
        config_dir,
        global_path,
        validator,
        state,
        app,
    })
}

/// A fresh directory to open as a project
pub fn create_project_dir() -> anyhow::Result<TempDir> {
    Ok(TempDir::new()?)
}
