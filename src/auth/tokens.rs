// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token issuance and verification (HS256 JWT).
//!
//! The signing secret is handed in once at construction from [`AuthConfig`];
//! this module never reads the environment. Tokens are stateless: nothing is
//! recorded server-side, and there is no revocation or refresh.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use super::{claims::TokenClaims, Role};
use crate::config::AuthConfig;

/// Token verification/issuance failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Signature mismatch, malformed token, or unparsable claims
    #[error("token is invalid")]
    Invalid,
    /// `exp` is in the past
    #[error("token has expired")]
    Expired,
    /// Signing failed
    #[error("failed to encode token: {0}")]
    Encode(String),
}

/// Mints and validates bearer tokens with a single server-held secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "iat"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl: config.token_ttl,
        }
    }

    /// Issue a token for an identity, valid from now for the configured TTL.
    pub fn issue(&self, user_id: &str, username: &str, role: Role) -> Result<String, TokenError> {
        self.issue_at(user_id, username, role, Utc::now())
    }

    /// Issue a token as if it had been minted at `issued_at`.
    pub fn issue_at(
        &self,
        user_id: &str,
        username: &str,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = TokenClaims {
            id: user_id.to_string(),
            username: username.to_string(),
            role,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
