// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration and login.
//!
//! Both endpoints are public. bcrypt runs on the blocking pool.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use super::ApiJson;
use crate::{
    auth::Role,
    error::ApiError,
    models::{AuthResponse, LoginRequest, RegisterRequest, UserResponse},
    state::AppState,
    storage::{AuditEvent, AuditEventType, AuditRepository, NewIdentity, StorageError, StoredUser, UserRepository},
};

fn issue_token(state: &AppState, user: &StoredUser) -> Result<String, ApiError> {
    state
        .tokens
        .issue(&user.id, &user.username, user.role)
        .map_err(|e| state.server_error("Failed to issue token", e))
}

/// Register a new identity.
///
/// The first identity ever registered becomes `admin`; every later one is
/// `user`.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Validation failed or user already exists"),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let input = request.into_registration()?;
    let storage = state.storage();

    if UserRepository::new(&storage)
        .find_by_email(&input.email)
        .map_err(|e| state.server_error("Failed to look up identity", e))?
        .is_some()
    {
        return Err(ApiError::duplicate_identity());
    }

    let passwords = Arc::clone(&state.passwords);
    let password = input.password;
    let password_hash = tokio::task::spawn_blocking(move || passwords.hash(&password))
        .await
        .map_err(|e| state.server_error("Password hashing task failed", e))?
        .map_err(|e| state.server_error("Failed to hash password", e))?;

    let new = NewIdentity {
        username: input.username,
        email: input.email,
        password_hash,
        company_name: input.company_name,
        phone: input.phone,
    };

    let guard = state.registration_lock.lock().await;
    let registered = UserRepository::new(&storage).register(&guard, new);
    drop(guard);

    let user = registered.map_err(|e| match e {
        StorageError::Duplicate(_) => ApiError::duplicate_identity(),
        other => state.server_error("Failed to create identity", other),
    })?;

    let token = issue_token(&state, &user)?;

    if user.role == Role::Admin {
        tracing::info!(user_id = %user.id, "Bootstrap admin registered");
    } else {
        tracing::info!(user_id = %user.id, "User registered");
    }
    AuditRepository::new(&storage).record(
        AuditEvent::new(AuditEventType::UserRegistered)
            .with_user(&user.id)
            .with_resource("user", &user.id),
    );

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            token,
            user: UserResponse::from(user),
        }),
    ))
}

/// Exchange email and password for a bearer token.
///
/// Unknown emails and wrong passwords get the same response, and an unknown
/// email still pays for one bcrypt verification.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Missing fields or invalid credentials"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (email, password) = request.into_credentials()?;
    let storage = state.storage();

    let user = UserRepository::new(&storage)
        .find_by_email(&email)
        .map_err(|e| state.server_error("Failed to look up identity", e))?;

    let passwords = Arc::clone(&state.passwords);
    let (user, matched) = tokio::task::spawn_blocking(move || match user {
        Some(user) => {
            let matched = passwords.verify(&password, &user.password_hash);
            (Some(user), matched)
        }
        None => {
            passwords.verify_dummy(&password);
            (None, false)
        }
    })
    .await
    .map_err(|e| state.server_error("Password verification task failed", e))?;

    let user = match (user, matched) {
        (Some(user), true) => user,
        (user, _) => {
            tracing::info!(known_email = user.is_some(), "Login rejected");
            let mut event = AuditEvent::new(AuditEventType::AuthFailure).failed("invalid credentials");
            if let Some(user) = &user {
                event = event.with_user(&user.id);
            }
            AuditRepository::new(&storage).record(event);
            return Err(ApiError::invalid_credentials());
        }
    };

    let token = issue_token(&state, &user)?;

    tracing::info!(user_id = %user.id, "Login succeeded");
    AuditRepository::new(&storage)
        .record(AuditEvent::new(AuditEventType::AuthSuccess).with_user(&user.id));

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: UserResponse::from(user),
    }))
}
