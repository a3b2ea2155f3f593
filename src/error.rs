use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::rate_limit_config::window_phrase;

pub type Result<T> = std::result::Result<T, WisdomError>;

#[derive(Debug, Clone, Error)]
pub enum WisdomError {
    #[error("Wisdom not found: {0}")]
    NotFound(String),

    #[error("No wisdom available")]
    EmptyCollection,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limit exceeded: {limit} per window")]
    RateLimited { limit: u32, retry_after_secs: u64 },

    #[error("Failed to load wisdom data: {0}")]
    DataLoad(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WisdomError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WisdomError::NotFound(_) | WisdomError::EmptyCollection => StatusCode::NOT_FOUND,
            WisdomError::Validation(_) => StatusCode::BAD_REQUEST,
            WisdomError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            WisdomError::DataLoad(_) | WisdomError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// JSON body returned for every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            retry_after: None,
        }
    }

    pub fn from_wisdom_error(err: &WisdomError) -> Self {
        match err {
            WisdomError::NotFound(_) => Self::new("not_found", "Wisdom not found"),
            WisdomError::EmptyCollection => Self::new("not_found", "No wisdom available"),
            WisdomError::Validation(msg) => Self::new("validation_error", msg),
            WisdomError::RateLimited {
                limit,
                retry_after_secs,
            } => Self {
                error: "Rate limit exceeded".to_string(),
                message: format!(
                    "Too many requests. Limit: {} per {}",
                    limit,
                    window_phrase(Duration::from_secs(*retry_after_secs))
                ),
                retry_after: Some(*retry_after_secs),
            },
            WisdomError::DataLoad(msg) | WisdomError::Internal(msg) => {
                Self::new("internal_error", msg)
            }
        }
    }
}

impl IntoResponse for WisdomError {
    fn into_response(self) -> Response {
        let body = ErrorResponse::from_wisdom_error(&self);
        let mut response = (self.status_code(), Json(body)).into_response();

        if let WisdomError::RateLimited {
            retry_after_secs, ..
        } = self
        {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }

        response
    }
}
