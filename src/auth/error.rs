// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::tokens::TokenError;

/// Authentication error type.
///
/// The 401 variants stay distinct so logs can tell a missing header from a
/// tampered or expired token, but they all render the same response body.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    /// No authorization header present
    MissingAuthHeader,
    /// Authorization header is not `Bearer <token>`
    InvalidAuthHeader,
    /// Signature mismatch or malformed token
    InvalidToken,
    /// Token has expired
    TokenExpired,
    /// Authenticated, but the role is not allowed here
    InsufficientPermissions,
}

#[derive(Serialize)]
struct AuthErrorBody {
    message: &'static str,
    error_code: &'static str,
}

impl AuthError {
    /// Internal reason code, used for logging.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::InvalidToken => "invalid_token",
            AuthError::TokenExpired => "token_expired",
            AuthError::InsufficientPermissions => "insufficient_permissions",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::InvalidToken
            | AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::Invalid | TokenError::Encode(_) => AuthError::InvalidToken,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingAuthHeader => write!(f, "Authorization header is required"),
            AuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            AuthError::InvalidToken => write!(f, "Token is invalid"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::InsufficientPermissions => {
                write!(f, "Insufficient permissions for this operation")
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::debug!(reason = self.reason(), "Request rejected by access gate");

        let body = if status == StatusCode::FORBIDDEN {
            AuthErrorBody {
                message: "Access denied",
                error_code: "forbidden",
            }
        } else {
            AuthErrorBody {
                message: "Not authenticated",
                error_code: "unauthenticated",
            }
        };
        (status, Json(body)).into_response()
    }
}
