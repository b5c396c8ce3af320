// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity record repository (the credential store).
//!
//! Each identity is stored as `users/{id}.json`. Emails are normalized to
//! trimmed lowercase on write and compared case-insensitively on lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::MutexGuard;

use super::is_valid_id;
use crate::auth::Role;
use crate::storage::{DocumentStorage, StorageError, StorageResult};

/// Identity record as persisted. Never serialized into a response; see
/// `UserResponse` for the client-facing shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: String,
    pub username: String,
    /// Trimmed, lowercase.
    pub email: String,
    /// bcrypt hash; never empty.
    pub password_hash: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to create an identity except its role.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub company_name: Option<String>,
    pub phone: Option<String>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Repository for identity records.
pub struct UserRepository<'a> {
    storage: &'a DocumentStorage,
}

impl<'a> UserRepository<'a> {
    pub fn new(storage: &'a DocumentStorage) -> Self {
        Self { storage }
    }

    pub fn find_by_id(&self, user_id: &str) -> StorageResult<StoredUser> {
        if !is_valid_id(user_id) {
            return Err(StorageError::NotFound(format!("User {user_id}")));
        }
        self.storage.read_json(self.storage.paths().user(user_id))
    }

    /// Case-insensitive lookup by email.
    pub fn find_by_email(&self, email: &str) -> StorageResult<Option<StoredUser>> {
        let email = normalize_email(email);
        Ok(self.list_all()?.into_iter().find(|u| u.email == email))
    }

    pub fn count_identities(&self) -> StorageResult<usize> {
        Ok(self
            .storage
            .list_files(self.storage.paths().users_dir(), "json")?
            .len())
    }

    pub fn count_by_role(&self, role: Role) -> StorageResult<usize> {
        Ok(self.list_all()?.iter().filter(|u| u.role == role).count())
    }

    /// All identities, newest first.
    pub fn list_all(&self) -> StorageResult<Vec<StoredUser>> {
        let mut users: Vec<StoredUser> = self
            .storage
            .read_all_json(self.storage.paths().users_dir())?;
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    /// Create an identity with an explicit role.
    ///
    /// Fails with `Duplicate` when the username or the email (ignoring case)
    /// is taken. The error does not say which.
    pub fn create_identity(&self, new: NewIdentity, role: Role) -> StorageResult<StoredUser> {
        if new.password_hash.is_empty() {
            return Err(StorageError::IntegrityViolation(
                "refusing to store an identity without a password hash".to_string(),
            ));
        }

        let username = new.username.trim().to_string();
        let email = normalize_email(&new.email);

        let taken = self
            .list_all()?
            .iter()
            .any(|u| u.email == email || u.username == username);
        if taken {
            return Err(StorageError::Duplicate("identity".to_string()));
        }

        let now = Utc::now();
        let user = StoredUser {
            id: uuid::Uuid::new_v4().to_string(),
            username,
            email,
            password_hash: new.password_hash,
            role,
            company_name: new.company_name,
            phone: new.phone,
            created_at: now,
            updated_at: now,
        };

        self.storage
            .write_json(self.storage.paths().user(&user.id), &user)?;
        Ok(user)
    }

    /// Register an identity, making the very first one admin.
    ///
    /// Counting and inserting happen while the caller holds the process-wide
    /// registration lock, so two concurrent first registrations cannot both
    /// observe an empty store.
    pub fn register(&self, _registration: &MutexGuard<'_, ()>, new: NewIdentity) -> StorageResult<StoredUser> {
        let role = Role::for_registration(self.count_identities()?);
        self.create_identity(new, role)
    }
}
