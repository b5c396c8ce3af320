// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::{extract::State, Json};

use crate::{
    audit_log,
    auth::{AdminOnly, Auth, Role},
    error::ApiError,
    models::{UserListResponse, UserResponse, UserStats},
    state::AppState,
    storage::{AuditEventType, StorageError, StorageResult, UserRepository},
};

/// Get the caller's own profile.
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User information", body = UserResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 404, description = "Identity no longer exists"),
    )
)]
pub async fn me(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let storage = state.storage();
    match UserRepository::new(&storage).find_by_id(&user.user_id) {
        Ok(stored) => Ok(Json(stored.into())),
        Err(StorageError::NotFound(_)) => Err(ApiError::not_found("User not found")),
        Err(e) => Err(state.server_error("Failed to load profile", e)),
    }
}

/// List every identity (admin only). Password hashes are never included.
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All users, newest first", body = UserListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
    )
)]
pub async fn list_users(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<UserListResponse>, ApiError> {
    let storage = state.storage();
    let users = UserRepository::new(&storage)
        .list_all()
        .map_err(|e| state.server_error("Failed to list users", e))?;

    audit_log!(&storage, AuditEventType::AdminAccess, admin, "user", "*");

    Ok(Json(UserListResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// Identity counts by role (admin only).
#[utoipa::path(
    get,
    path = "/api/users/stats",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User counts", body = UserStats),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
    )
)]
pub async fn user_stats(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<UserStats>, ApiError> {
    let storage = state.storage();
    let stats = role_counts(&UserRepository::new(&storage))
        .map_err(|e| state.server_error("Failed to compute user stats", e))?;

    Ok(Json(stats))
}

fn role_counts(repo: &UserRepository<'_>) -> StorageResult<UserStats> {
    Ok(UserStats {
        total_users: repo.count_identities()?,
        admin_users: repo.count_by_role(Role::Admin)?,
        regular_users: repo.count_by_role(Role::User)?,
    })
}
