use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use shared_types::ErrorResponse;
use thiserror::Error;

use crate::settings::SettingsError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Settings(SettingsError::Validation { .. })
            | ApiError::Settings(SettingsError::ScopeUnavailable) => StatusCode::NOT_ACCEPTABLE,
            ApiError::Settings(SettingsError::ProjectNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Settings(SettingsError::Persistence { .. })
            | ApiError::Settings(SettingsError::Serialize(_))
            | ApiError::Settings(SettingsError::LockPoisoned(_))
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
