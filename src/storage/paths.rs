// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the document store layout.

use std::path::{Path, PathBuf};

/// Default base directory for persistent storage.
pub const DATA_ROOT: &str = "./data";

/// Storage path utilities for the document store.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all documents.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== User Paths ==========

    /// Directory containing all identity records.
    pub fn users_dir(&self) -> PathBuf {
        self.root.join("users")
    }

    /// Path to a specific identity record.
    pub fn user(&self, user_id: &str) -> PathBuf {
        self.users_dir().join(format!("{user_id}.json"))
    }

    // ========== Lead Paths ==========

    pub fn leads_dir(&self) -> PathBuf {
        self.root.join("leads")
    }

    pub fn lead(&self, lead_id: &str) -> PathBuf {
        self.leads_dir().join(format!("{lead_id}.json"))
    }

    // ========== Task Paths ==========

    pub fn tasks_dir(&self) -> PathBuf {
        self.root.join("tasks")
    }

    pub fn task(&self, task_id: &str) -> PathBuf {
        self.tasks_dir().join(format!("{task_id}.json"))
    }

    // ========== Ticket Paths ==========

    pub fn tickets_dir(&self) -> PathBuf {
        self.root.join("tickets")
    }

    pub fn ticket(&self, ticket_id: &str) -> PathBuf {
        self.tickets_dir().join(format!("{ticket_id}.json"))
    }

    // ========== Audit Log Paths ==========

    /// Directory containing audit logs.
    pub fn audit_dir(&self) -> PathBuf {
        self.root.join("audit")
    }

    /// Path to a daily audit events file (JSONL format).
    pub fn audit_events_file(&self, date: &str) -> PathBuf {
        self.audit_dir().join(date).join("events.jsonl")
    }
}
