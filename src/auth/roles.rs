// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User roles for authorization.
///
/// ## Role Hierarchy
///
/// - `Admin` - Sees and mutates every lead, task and ticket; manages users
/// - `User` - Sees and mutates only the records they created
///
/// The first identity ever registered becomes `Admin`; all later ones are `User`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Regular account, scoped to its own records
    User,
}

impl Role {
    /// Role assigned at registration, given how many identities already exist.
    pub fn for_registration(existing_identities: usize) -> Role {
        if existing_identities == 0 {
            Role::Admin
        } else {
            Role::User
        }
    }
}

impl Default for Role {
    /// Default role is User (least privilege for authenticated users).
    fn default() -> Self {
        Role::User
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
        }
    }
}
