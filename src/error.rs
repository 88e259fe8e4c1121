use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, warn};

/// Body returned for every failed generation, whatever the upstream said.
pub const GENERATION_FAILED: &str = "Failed to generate itinerary";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error("{0}")]
    Validation(String),
    #[error("auth service rejected the request: {0}")]
    Upstream(Value),
    #[error("itinerary generation failed: {0}")]
    Generation(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
    #[error("not found")]
    NotFound,
    #[error("unauthorized")]
    Unauthorized,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Upstream(_) | AppError::Database(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Config(_)
            | AppError::Generation(_)
            | AppError::Io(_)
            | AppError::Migrate(_)
            | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Upstream(body) => body,
            AppError::Generation(detail) => {
                error!(%detail, "itinerary generation failed");
                json!({ "error": GENERATION_FAILED })
            }
            AppError::Database(err) => {
                warn!("store request failed: {err}");
                json!({ "error": err.to_string() })
            }
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
