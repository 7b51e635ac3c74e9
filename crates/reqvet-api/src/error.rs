//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Every failure surface maps to a stable machine-readable code and an HTTP
//! status; validation failures additionally carry the field-addressed error
//! map in the `data` field so clients can render per-field diagnostics.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqvet_core::ErrorMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured JSON error response body.
///
/// All error responses use this format for consistency across the API
/// surface: `{"error": {"code": ..., "message": ..., "data": ...}}` with
/// `data` omitted when there is nothing structured to attach.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "INVALID_INPUT_FORMAT_JSON").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Structured context: the validation error map for input errors, the
    /// missing field name for file errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
///
/// The four input variants correspond to the four request channels a
/// validator can cover. Each carries the endpoint name (for the message)
/// plus channel-specific context.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Unclassified server-side failure (500).
    #[error("{0}")]
    Generic(String),

    /// Query-string parameters failed validation (400).
    #[error("Invalid input format for '{endpoint}'")]
    InvalidQueryString {
        /// The endpoint whose validator rejected the input.
        endpoint: String,
        /// Field-addressed violations.
        errors: ErrorMap,
    },

    /// Form-data fields failed validation (400).
    #[error("Invalid input format for '{endpoint}'")]
    InvalidFormData {
        /// The endpoint whose validator rejected the input.
        endpoint: String,
        /// Field-addressed violations.
        errors: ErrorMap,
    },

    /// JSON body failed validation (400).
    #[error("Invalid input format for '{endpoint}'")]
    InvalidJson {
        /// The endpoint whose validator rejected the input.
        endpoint: String,
        /// Field-addressed violations.
        errors: ErrorMap,
    },

    /// A required upload is missing from the multipart body (400).
    #[error("Invalid input format for '{endpoint}'")]
    InvalidFiles {
        /// The endpoint whose validator rejected the input.
        endpoint: String,
        /// The missing file field.
        field: String,
    },
}

impl ApiError {
    /// Return the HTTP status code and machine-readable error code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Generic(_) => (StatusCode::INTERNAL_SERVER_ERROR, "GENERIC"),
            Self::InvalidQueryString { .. } => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT_FORMAT_QUERYSTRING")
            }
            Self::InvalidFormData { .. } => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT_FORMAT_FORMDATA")
            }
            Self::InvalidJson { .. } => (StatusCode::BAD_REQUEST, "INVALID_INPUT_FORMAT_JSON"),
            Self::InvalidFiles { .. } => (StatusCode::BAD_REQUEST, "INVALID_INPUT_FORMAT_FILES"),
        }
    }

    /// Structured context attached to the response body, if any.
    fn data(&self) -> Option<serde_json::Value> {
        match self {
            Self::Generic(_) => None,
            Self::InvalidQueryString { errors, .. }
            | Self::InvalidFormData { errors, .. }
            | Self::InvalidJson { errors, .. } => Some(errors.to_value()),
            Self::InvalidFiles { field, .. } => Some(serde_json::Value::String(field.clone())),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if matches!(&self, Self::Generic(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                data: self.data(),
            },
        };

        (status, Json(body)).into_response()
    }
}
