pub mod health;
pub mod key_check;
pub mod project;
pub mod settings;

use actix_web::web;
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::{ApiError, ApiResult};
use crate::settings::{SettingsService, SettingsStore};
use crate::verifier::KeyVerifier;

/// Shared state handed to every handler through `web::Data`
pub struct AppState {
    pub settings: SettingsService,
    pub verifier: KeyVerifier,
    pub start_time: SystemTime,
}

impl AppState {
    pub fn new(settings: SettingsService, verifier: KeyVerifier) -> Self {
        Self {
            settings,
            verifier,
            start_time: SystemTime::now(),
        }
    }
}

/// The shared settings store. The first load touches the disk, so it runs
/// on the blocking pool.
pub async fn settings_store(data: &web::Data<AppState>) -> ApiResult<Arc<SettingsStore>> {
    if data.settings.is_loaded() {
        return Ok(data.settings.current()?);
    }

    let state = data.clone();
    let store = web::block(move || state.settings.current())
        .await
        .map_err(|e| ApiError::Internal(format!("Loading settings was interrupted: {}", e)))??;
    Ok(store)
}

/// Registers every API route under `/api`. Shared by the server and tests.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .service(key_check::check_key)
            .service(settings::get_settings)
            .service(settings::patch_settings)
            .service(project::get_project)
            .service(project::open_project)
            .service(project::close_project),
    );
}
