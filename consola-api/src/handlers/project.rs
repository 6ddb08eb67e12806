use actix_web::{get, post, web, HttpResponse};
use shared_types::{OpenProjectRequest, ProjectResponse, StatusResponse};
use std::path::{Path, PathBuf};

use super::{settings_store, AppState};
use crate::error::{ApiError, ApiResult};

fn project_response(path: Option<PathBuf>) -> ProjectResponse {
    ProjectResponse {
        path: path.map(|p| p.to_string_lossy().into_owned()),
    }
}

#[get("/project")]
pub async fn get_project(data: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let store = settings_store(&data).await?;
    Ok(HttpResponse::Ok().json(project_response(store.active_project()?)))
}

#[post("/project/open")]
pub async fn open_project(
    data: web::Data<AppState>,
    request: web::Json<OpenProjectRequest>,
) -> ApiResult<HttpResponse> {
    let store = settings_store(&data).await?;
    let root = request.into_inner().path;

    let opened = web::block(move || store.open_project(Path::new(&root)))
        .await
        .map_err(|e| ApiError::Internal(format!("Opening project was interrupted: {}", e)))??;

    Ok(HttpResponse::Ok().json(project_response(Some(opened))))
}

#[post("/project/close")]
pub async fn close_project(data: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let store = settings_store(&data).await?;
    store.close_project()?;
    Ok(HttpResponse::Ok().json(StatusResponse::ok()))
}
