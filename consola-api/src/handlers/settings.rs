use actix_web::{get, patch, web, HttpResponse};
use serde_json::{Map, Value};
use shared_types::StatusResponse;

use super::{settings_store, AppState};
use crate::error::{ApiError, ApiResult};
use crate::settings::SettingsPatch;

#[get("/settings")]
pub async fn get_settings(data: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let store = settings_store(&data).await?;
    let merged = store.get_merged()?;
    Ok(HttpResponse::Ok().json(merged))
}

/// Apply a sparse update. `to_global` in the body picks the target scope.
#[patch("/settings")]
pub async fn patch_settings(
    data: web::Data<AppState>,
    body: web::Json<Map<String, Value>>,
) -> ApiResult<HttpResponse> {
    let (patch, to_global) = SettingsPatch::from_request(body.into_inner())?;
    let store = settings_store(&data).await?;

    // Disk write and scope lock stay off the async workers
    web::block(move || store.apply(&patch, to_global))
        .await
        .map_err(|e| ApiError::Internal(format!("Settings update was interrupted: {}", e)))??;

    Ok(HttpResponse::Ok().json(StatusResponse::ok()))
}
