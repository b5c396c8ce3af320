// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use validator::ValidationErrors;

/// Message every unexpected failure is reported with.
pub const SERVER_ERROR_MESSAGE: &str = "Server error";

/// Message for both unknown accounts and wrong passwords.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";

/// Message for registration collisions, whichever unique field collided.
pub const DUPLICATE_IDENTITY_MESSAGE: &str = "User already exists";

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    /// Internal error detail; only populated outside production.
    pub detail: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            detail: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn invalid_credentials() -> Self {
        Self::bad_request(INVALID_CREDENTIALS_MESSAGE)
    }

    pub fn duplicate_identity() -> Self {
        Self::bad_request(DUPLICATE_IDENTITY_MESSAGE)
    }

    /// Generic 500. `detail` is attached verbatim; callers decide whether
    /// the environment allows exposing it (see `AppState::server_error`).
    pub fn internal(detail: Option<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: SERVER_ERROR_MESSAGE.to_string(),
            detail,
        }
    }
}

/// Ordering of validation failures when several fields fail at once:
/// missing values first, then malformed emails, then everything else.
fn violation_rank(code: &str) -> u8 {
    match code {
        "required" => 0,
        "email" => 1,
        _ => 2,
    }
}

impl From<ValidationErrors> for ApiError {
    /// Reports the single highest-ranked violation as the message.
    fn from(errors: ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .into_values()
            .flat_map(|field| field.iter())
            .min_by_key(|error| violation_rank(&error.code))
            .and_then(|error| error.message.clone())
            .map(|message| message.into_owned())
            .unwrap_or_else(|| "Invalid request".to_string());
        Self::bad_request(message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            message: self.message,
            error: self.detail,
        });
        (self.status, body).into_response()
    }
}
