use actix_web::{get, web, HttpResponse, Responder};
use shared_types::ServerStatus;

use super::AppState;

#[get("/health")]
pub async fn health_check(data: web::Data<AppState>) -> impl Responder {
    let uptime = data
        .start_time
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or_default();

    HttpResponse::Ok().json(ServerStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime,
    })
}
