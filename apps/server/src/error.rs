// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types and handling for the server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Linking config failed validation")]
    Validation { errors: Vec<String> },

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error(transparent)]
    Linking(budget_link_core::Error),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use budget_link_core::Error as Core;

        let (status, code) = match &self {
            ApiError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ApiError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            ApiError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND"),
            ApiError::Linking(err) => match err {
                Core::Json(_) => (StatusCode::BAD_REQUEST, "INVALID_JSON"),
                Core::Csv { .. } => (StatusCode::BAD_REQUEST, "INVALID_CSV"),
                Core::InvalidConfig { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
                Core::DuplicateLinkId(_) => (StatusCode::CONFLICT, "DUPLICATE_LINK"),
                Core::LinkNotFound(_) => (StatusCode::NOT_FOUND, "LINK_NOT_FOUND"),
                Core::PatternTable(_) => (StatusCode::BAD_REQUEST, "INVALID_PATTERN_TABLE"),
            },
        };

        let details = match self {
            ApiError::Validation { ref errors }
            | ApiError::Linking(budget_link_core::Error::InvalidConfig { ref errors }) => {
                errors.clone()
            }
            _ => Vec::new(),
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<budget_link_core::Error> for ApiError {
    fn from(err: budget_link_core::Error) -> Self {
        match err {
            budget_link_core::Error::InvalidConfig { errors } => ApiError::Validation { errors },
            other => ApiError::Linking(other),
        }
    }
}

