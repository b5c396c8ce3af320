// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password hashing via bcrypt.
//!
//! bcrypt is deliberately slow; callers on the async runtime should run these
//! methods inside `tokio::task::spawn_blocking`.

use thiserror::Error;

/// bcrypt cost factor used in production.
pub const BCRYPT_COST: u32 = 10;

/// Input for the dummy hash computed at startup. Never a real credential.
const DUMMY_PASSWORD: &str = "crm-timing-equalizer";

#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordError(#[from] bcrypt::BcryptError);

/// One-way password hashing and verification.
///
/// Holds a dummy hash of the same cost as real hashes so that a login for an
/// unknown account spends the same time in bcrypt as a wrong password.
#[derive(Debug, Clone)]
pub struct PasswordVerifier {
    cost: u32,
    dummy_hash: String,
}

impl PasswordVerifier {
    pub fn new(cost: u32) -> Result<Self, PasswordError> {
        let dummy_hash = bcrypt::hash(DUMMY_PASSWORD, cost)?;
        Ok(Self { cost, dummy_hash })
    }

    /// Hash a plaintext password with a fresh salt.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        Ok(bcrypt::hash(plaintext, self.cost)?)
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// A stored hash that bcrypt cannot parse counts as a mismatch.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        match bcrypt::verify(plaintext, hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash is unreadable");
                false
            }
        }
    }

    /// Burn one verification against the dummy hash; the result is discarded.
    pub fn verify_dummy(&self, plaintext: &str) {
        let _ = bcrypt::verify(plaintext, &self.dummy_hash);
    }
}
