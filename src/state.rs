// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    auth::{PasswordVerifier, TokenService},
    config::AppEnvironment,
    error::ApiError,
    storage::DocumentStorage,
};

/// Shared, read-only application state.
///
/// Nothing here changes per request; callers are re-derived from their token
/// every time. The only coordination point is `registration_lock`.
#[derive(Clone)]
pub struct AppState {
    storage: Arc<DocumentStorage>,
    pub tokens: Arc<TokenService>,
    pub passwords: Arc<PasswordVerifier>,
    pub environment: AppEnvironment,
    /// Serializes the count-then-insert of identity registration.
    pub registration_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(
        storage: DocumentStorage,
        tokens: TokenService,
        passwords: PasswordVerifier,
        environment: AppEnvironment,
    ) -> Self {
        Self {
            storage: Arc::new(storage),
            tokens: Arc::new(tokens),
            passwords: Arc::new(passwords),
            environment,
            registration_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn storage(&self) -> Arc<DocumentStorage> {
        Arc::clone(&self.storage)
    }

    /// Log an unexpected failure and turn it into a generic 500.
    ///
    /// The underlying error text only reaches the client outside production.
    pub fn server_error(&self, context: &str, error: impl std::fmt::Display) -> ApiError {
        tracing::error!(error = %error, "{context}");
        let detail = (!self.environment.is_production()).then(|| error.to_string());
        ApiError::internal(detail)
    }
}
