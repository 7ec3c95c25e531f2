use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::domain::{DomainError, ErrorKind};

#[derive(Debug)]
pub enum AppError {
    Domain(DomainError),
    Database(sqlx::Error),
    Session(tower_sessions::session::Error),
    PasswordHash(argon2::password_hash::Error),
    Unauthorized,
    NotFound,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Domain(e) => match e.kind() {
                ErrorKind::NotFound if !e.is_request_field() => StatusCode::NOT_FOUND,
                ErrorKind::Authorization => StatusCode::FORBIDDEN,
                _ => StatusCode::BAD_REQUEST,
            },
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Session(_) | AppError::PasswordHash(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            AppError::Domain(e) => {
                tracing::debug!(error = %e, "request rejected");
                let mut body = serde_json::Map::new();
                body.insert(e.field().to_string(), json!([e.to_string()]));
                (status, Json(body)).into_response()
            }
            AppError::Unauthorized => (
                status,
                Json(json!({ "detail": "Authentication credentials were not provided." })),
            )
                .into_response(),
            AppError::NotFound => (status, Json(json!({ "detail": "Not found." }))).into_response(),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (status, "Internal server error").into_response()
            }
            AppError::Session(e) => {
                tracing::error!("Session error: {e}");
                (status, "Internal server error").into_response()
            }
            AppError::PasswordHash(e) => {
                tracing::error!("Password hash error: {e}");
                (status, "Internal server error").into_response()
            }
        }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        AppError::Domain(e)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e)
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(e: tower_sessions::session::Error) -> Self {
        AppError::Session(e)
    }
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(e: argon2::password_hash::Error) -> Self {
        AppError::PasswordHash(e)
    }
}
