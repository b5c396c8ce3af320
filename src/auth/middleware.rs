// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Applied to every protected route group so that no handler there can run
//! without a verified caller. The verified identity is stored in the request
//! extensions, where the `Auth` extractor picks it up without re-verifying.
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/leads", get(list_leads))
//!     .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::extractor::authenticate;
use crate::state::AppState;

/// Authentication middleware function.
pub async fn require_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    match authenticate(request.headers(), &state.tokens) {
        Ok(user) => {
            tracing::debug!(user_id = %user.user_id, role = %user.role, "Caller authenticated");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            tracing::info!(
                reason = e.reason(),
                path = %request.uri().path(),
                "Unauthenticated request rejected"
            );
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedUser, PasswordVerifier, Role, TokenService};
    use crate::config::{AppEnvironment, AuthConfig};
    use crate::storage::{DocumentStorage, StoragePaths};
    use axum::{body::Body, http::StatusCode, routing::get, Extension, Router};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState::new(
            DocumentStorage::new(StoragePaths::new("/tmp/unused")),
            TokenService::new(&AuthConfig {
                jwt_secret: "middleware-secret".to_string(),
                token_ttl: chrono::Duration::hours(24),
            }),
            PasswordVerifier::new(4).unwrap(),
            AppEnvironment::Development,
        )
    }

    fn app(state: AppState) -> Router {
        Router::new()
            .route(
                "/whoami",
                get(|Extension(user): Extension<AuthenticatedUser>| async move { user.username }),
            )
            .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth))
            .with_state(state)
    }

    #[tokio::test]
    async fn attaches_identity_for_valid_token() {
        let state = test_state();
        let token = state.tokens.issue("u1", "carol", Role::User).unwrap();

        let response = app(state)
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.as_ref(), b"carol");
    }

    #[tokio::test]
    async fn rejects_missing_token() {
        let response = app(test_state())
            .oneshot(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
