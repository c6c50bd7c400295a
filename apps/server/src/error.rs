use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use caritas_core::errors::{Error as CoreError, ValidationError};
use thiserror::Error;

use crate::models::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    /// A core error raised by a mutating operation.
    #[error("{0}")]
    Write(CoreError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
}

impl ApiError {
    /// Wraps the error of a write so that an unknown outcome is reported.
    pub fn write(err: CoreError) -> Self {
        ApiError::Write(err)
    }
}

fn status_of(err: &CoreError) -> StatusCode {
    match err {
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::InvalidState { .. } => StatusCode::CONFLICT,
        CoreError::Database(_) | CoreError::InvalidConfigValue(_) | CoreError::Unexpected(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn details_of(err: &CoreError, is_write: bool) -> Option<Vec<String>> {
    match err {
        CoreError::Validation(ValidationError::MissingField(field)) => {
            Some(vec![format!("{}: required", field)])
        }
        CoreError::InvalidState { status, .. } => Some(vec![format!("currentStatus: {}", status)]),
        _ if is_write && err.is_outcome_unknown() => Some(vec![format!(
            "outcome unknown: {}. Check the current state before retrying",
            err
        )]),
        _ => None,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, errors) = match &self {
            ApiError::Core(e) => (status_of(e), details_of(e, false)),
            ApiError::Write(e) => (status_of(e), details_of(e, true)),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, None),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, None),
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = Json(ApiResponse::failure(self.to_string(), errors));
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
