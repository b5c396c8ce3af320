// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated callers.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::{AuthError, AuthenticatedUser, Role, TokenService};
use crate::state::AppState;

/// Verify the bearer token in `headers` and derive the caller from it.
///
/// This is the only transition from "unauthenticated" to
/// "authenticated(claims)"; nothing is carried over between requests.
pub fn authenticate(headers: &HeaderMap, tokens: &TokenService) -> Result<AuthenticatedUser, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::InvalidAuthHeader)?;

    let claims = tokens.verify(token)?;
    Ok(AuthenticatedUser::from_claims(claims))
}

/// Fail with 403 unless the caller's role is one of `allowed`.
pub fn require_role(user: &AuthenticatedUser, allowed: &[Role]) -> Result<(), AuthError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        tracing::warn!(
            user_id = %user.user_id,
            role = %user.role,
            "Role not permitted for this operation"
        );
        Err(AuthError::InsufficientPermissions)
    }
}

/// Extractor for authenticated users.
///
/// Prefers the identity already attached by the `require_auth` middleware and
/// falls back to verifying the Authorization header itself.
///
/// # Example
///
/// ```rust,ignore
/// async fn list_leads(
///     Auth(user): Auth,
///     State(state): State<AppState>,
/// ) -> Result<Json<LeadListResponse>, ApiError> {
///     // user.user_id is the caller's identity record ID
/// }
/// ```
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let user = authenticate(&parts.headers, &state.tokens).inspect_err(|e| {
            tracing::debug!(reason = e.reason(), "Bearer token rejected");
        })?;
        Ok(Auth(user))
    }
}

/// Extractor that requires admin role.
pub struct AdminOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;
        require_role(&user, &[Role::Admin])?;
        Ok(AdminOnly(user))
    }
}
