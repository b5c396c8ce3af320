// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Locally issued bearer tokens for the CRM API.
//!
//! ## Auth Flow
//!
//! 1. A client registers or logs in with email and password
//! 2. The server verifies the bcrypt hash and issues an HS256 token
//!    carrying `{ id, username, role, iat, exp }`
//! 3. Every protected request sends `Authorization: Bearer <token>`;
//!    `require_auth` verifies it and attaches an `AuthenticatedUser`
//!
//! ## Security
//!
//! - All non-auth, non-health endpoints require authentication
//! - Every 401 has the same body regardless of why the token was rejected
//! - Claims are trusted until expiry; role changes apply on the next login

pub mod claims;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod password;
pub mod roles;
pub mod tokens;

pub use claims::{AuthenticatedUser, TokenClaims};
pub use error::AuthError;
pub use extractor::{authenticate, require_role, AdminOnly, Auth};
pub use middleware::require_auth;
pub use password::{PasswordError, PasswordVerifier, BCRYPT_COST};
pub use roles::Role;
pub use tokens::{TokenError, TokenService};
