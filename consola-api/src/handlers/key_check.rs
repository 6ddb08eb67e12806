use actix_web::{get, web, HttpResponse, Responder};
use serde::Deserialize;
use shared_types::KeyResponse;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct KeyQuery {
    #[serde(default)]
    pub key: String,
}

/// Echo the key back when the provider accepts it, `null` otherwise.
/// An unusable key is an expected answer, so this always responds 200.
#[get("/key")]
pub async fn check_key(data: web::Data<AppState>, query: web::Query<KeyQuery>) -> impl Responder {
    let key = query.into_inner().key.trim().to_string();
    let check = data.verifier.verify(&key).await;

    HttpResponse::Ok().json(KeyResponse {
        key: check.is_valid().then_some(key),
    })
}
