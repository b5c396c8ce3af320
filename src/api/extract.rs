// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request body extraction.
//!
//! [`ApiJson`] wraps `axum::Json` so that a body which is not JSON, has the
//! wrong content type, or does not fit the request type is answered with the
//! same `400 {message}` shape as every other validation failure.

use axum::extract::{rejection::JsonRejection, FromRequest};

use crate::error::ApiError;

/// Message for request bodies that cannot be read as the expected JSON.
pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";

/// JSON request body with API-shaped rejections.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(status = %rejection.status(), reason = %rejection.body_text(), "Rejected request body");
        ApiError::bad_request(INVALID_BODY_MESSAGE)
    }
}
