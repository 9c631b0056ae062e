use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by handlers. Every variant renders as `{"message": ...}`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing field or violated length/count constraint.
    #[error("validation error: {0}")]
    Validation(String),

    /// Bad email or password at login.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(&'static str),

    #[error("authentication required")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    /// Repository or signing failure.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidCredentials(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Validation(msg) => {
                tracing::debug!(%msg, "validation failed");
                msg.clone()
            }
            AppError::InvalidCredentials(msg) => {
                tracing::warn!(%msg, "login rejected");
                (*msg).to_string()
            }
            AppError::Unauthorized => "Authentication required".to_string(),
            AppError::Forbidden => {
                tracing::warn!("forbidden");
                "You are not allowed to do that".to_string()
            }
            AppError::NotFound(what) => format!("{} not found", capitalize(what)),
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                "Server error".to_string()
            }
        };

        (self.status(), Json(json!({ "message": message }))).into_response()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
