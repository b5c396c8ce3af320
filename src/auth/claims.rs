// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Claims carried inside a bearer token.
///
/// Wire shape: `{ id, username, role, iat, exp }`. Claims are immutable once
/// issued; a role change in the store only takes effect on the next login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Identity record ID
    pub id: String,
    /// Username at issuance time
    pub username: String,
    /// Role at issuance time
    pub role: Role,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
}

/// Authenticated caller, derived fresh from the token on every request.
///
/// This is the primary type used throughout the application to represent
/// the caller making a request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Identity record ID
    pub user_id: String,
    /// Username claim
    pub username: String,
    /// User's role
    pub role: Role,
}

impl AuthenticatedUser {
    /// Create from verified token claims.
    pub fn from_claims(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.id,
            username: claims.username,
            role: claims.role,
        }
    }

    /// Check if this user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
