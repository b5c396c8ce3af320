// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Document store write/read probe ("ok" or "unavailable").
    pub storage: String,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

fn check_storage(state: &AppState) -> String {
    match state.storage().health_check() {
        Ok(()) => "ok".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Storage health probe failed");
            "unavailable".to_string()
        }
    }
}

/// Health check endpoint handler.
///
/// Returns 200 if all checks pass, 503 if any check fails.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = ReadyResponse),
        (status = 503, description = "Service is unhealthy", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let storage = check_storage(&state);
    let all_ok = storage == "ok";

    let response = ReadyResponse {
        status: if all_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            storage,
        },
    };

    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Liveness probe handler. Always 200 while the process is running.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe handler.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(state: State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    health(state).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::test_state;
    use crate::auth::{PasswordVerifier, TokenService};
    use crate::config::{AppEnvironment, AuthConfig};
    use crate::storage::{DocumentStorage, StoragePaths};

    #[tokio::test]
    async fn initialized_storage_is_healthy() {
        let (_temp, state) = test_state();
        let (status, Json(body)) = health(State(state)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.checks.storage, "ok");
    }

    #[tokio::test]
    async fn uninitialized_storage_is_degraded() {
        let tokens = TokenService::new(&AuthConfig {
            jwt_secret: "health".into(),
            token_ttl: chrono::Duration::hours(1),
        });
        let state = AppState::new(
            DocumentStorage::new(StoragePaths::new("/tmp/never-initialized")),
            tokens,
            PasswordVerifier::new(4).unwrap(),
            AppEnvironment::Development,
        );

        let (status, Json(body)) = readiness(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");
        assert_eq!(body.checks.storage, "unavailable");
    }

    #[tokio::test]
    async fn liveness_is_always_ok() {
        assert_eq!(liveness().await.0.status, "ok");
    }
}
