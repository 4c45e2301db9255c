use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Structured error types for the autocomplete pipeline and its transport
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("External lookup failed: {0}")]
    ExternalLookup(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("{0}")]
    SuggestionRetrieval(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl AppError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::HttpError {
            status,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::TimeoutError(message.into())
    }

    pub fn external_lookup(message: impl Into<String>) -> Self {
        Self::ExternalLookup(message.into())
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache(message.into())
    }

    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::SuggestionRetrieval(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }

    /// Pipeline stage the error originated from, for log context.
    pub fn stage(&self) -> &'static str {
        match self {
            AppError::TimeoutError(_)
            | AppError::HttpError { .. }
            | AppError::NetworkError(_)
            | AppError::ParseError(_)
            | AppError::ExternalLookup(_) => "external_lookup",
            AppError::Persistence(_) => "store",
            AppError::Cache(_) => "cache",
            AppError::SuggestionRetrieval(_) => "orchestrator",
            AppError::ValidationError(_) => "validation",
            AppError::InternalError(_) => "internal",
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::TimeoutError(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::HttpError { status, .. } => {
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::NetworkError(_) | AppError::ExternalLookup(_) => StatusCode::BAD_GATEWAY,
            AppError::ParseError(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Persistence(_)
            | AppError::Cache(_)
            | AppError::SuggestionRetrieval(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}
