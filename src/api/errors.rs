//! API Error Handling
//!
//! Structured error responses with proper HTTP status codes and request
//! tracking. Settlement rejections keep their stable reason codes on the
//! wire so callers can branch without parsing messages.

use crate::errors::SpinError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level API error response with request tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub request_id: String,
    pub error: ErrorBody,
}

/// Error body with structured information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable machine-readable reason code (INVALID_WAGER, RATE_LIMITED, ...).
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error with request tracking.
#[derive(Debug)]
pub struct ApiError {
    pub request_id: String,
    pub status: StatusCode,
    pub code: String,
    pub message: String,
}

impl ApiError {
    /// Map a settlement rejection onto its HTTP status, keeping the
    /// engine's reason code.
    pub fn from_spin(request_id: String, err: SpinError) -> Self {
        let status = match &err {
            SpinError::InvalidWager(_)
            | SpinError::InvalidPlayerId(_)
            | SpinError::InvalidAmount(_)
            | SpinError::InsufficientBalance { .. } => StatusCode::BAD_REQUEST,
            SpinError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            SpinError::PlayerNotFound(_) => StatusCode::NOT_FOUND,
            SpinError::AccountBlocked => StatusCode::FORBIDDEN,
            SpinError::EntropyUnavailable(_)
            | SpinError::ArithmeticOverflow(_)
            | SpinError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            request_id,
            status,
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }

    pub fn bad_request(request_id: String, message: String) -> Self {
        Self {
            request_id,
            status: StatusCode::BAD_REQUEST,
            code: "BAD_REQUEST".to_string(),
            message,
        }
    }

    pub fn forbidden(request_id: String, message: String) -> Self {
        Self {
            request_id,
            status: StatusCode::FORBIDDEN,
            code: "FORBIDDEN".to_string(),
            message,
        }
    }

    pub fn internal_error(request_id: String, message: String) -> Self {
        Self {
            request_id,
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR".to_string(),
            message,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.request_id, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            request_id: self.request_id,
            error: ErrorBody {
                code: self.code,
                message: self.message,
            },
        });

        (self.status, body).into_response()
    }
}
