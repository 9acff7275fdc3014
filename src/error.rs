use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// Logged in full, but the response body carries only the generic message.
    #[error("{0}")]
    Concealed(Box<AppError>),
}

impl AppError {
    pub fn conceal(self) -> Self {
        match self {
            AppError::Concealed(_) => self,
            other => AppError::Concealed(Box::new(other)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::INTERNAL_SERVER_ERROR;

        tracing::error!("Error response: {} - {}", status, self);

        let body = match &self {
            AppError::Concealed(_) => json!({ "message": INTERNAL_MESSAGE }),
            other => json!({ "message": INTERNAL_MESSAGE, "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
