// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Audit logging for security-sensitive operations.
//!
//! Authentication outcomes, registrations, admin access and changes to owned
//! records are appended to a daily JSONL file under `audit/`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DocumentStorage, StorageResult};

/// Types of auditable events.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    // Auth events
    AuthSuccess,
    AuthFailure,
    UserRegistered,
    PermissionDenied,

    // Admin events
    AdminAccess,

    // Lead events
    LeadCreated,
    LeadUpdated,
    LeadDeleted,

    // Task events
    TaskCreated,
    TaskUpdated,
    TaskDeleted,

    // Ticket events
    TicketCreated,
    TicketUpdated,
    TicketDeleted,
}

/// An audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: AuditEventType,
    /// Identity that triggered the event, if known.
    pub user_id: Option<String>,
    pub resource_id: Option<String>,
    /// Resource kind (lead, task, ticket, user).
    pub resource_type: Option<String>,
    pub success: bool,
    pub error: Option<String>,
}

impl AuditEvent {
    pub fn new(event_type: AuditEventType) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type,
            user_id: None,
            resource_id: None,
            resource_type: None,
            success: true,
            error: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_resource(
        mut self,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        self.resource_type = Some(resource_type.into());
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Mark as failed with error message.
    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.success = false;
        self.error = Some(error.into());
        self
    }
}

/// Repository for audit events.
pub struct AuditRepository<'a> {
    storage: &'a DocumentStorage,
}

impl<'a> AuditRepository<'a> {
    pub fn new(storage: &'a DocumentStorage) -> Self {
        Self { storage }
    }

    /// Append an event to the log file for its day.
    pub fn log(&self, event: &AuditEvent) -> StorageResult<()> {
        let date = event.timestamp.format("%Y-%m-%d").to_string();
        let path = self.storage.paths().audit_events_file(&date);

        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');
        self.storage.append_raw(path, &line)
    }

    /// Log an event, reporting failures to the tracing log only.
    ///
    /// An audit write failure never fails the request that triggered it.
    pub fn record(&self, event: AuditEvent) {
        if let Err(e) = self.log(&event) {
            tracing::warn!(
                error = %e,
                event_type = ?event.event_type,
                "Failed to write audit event"
            );
        }
    }

    /// Read audit events for a specific date (`YYYY-MM-DD`).
    pub fn read_events(&self, date: &str) -> StorageResult<Vec<AuditEvent>> {
        let path = self.storage.paths().audit_events_file(date);
        let content = self.storage.read_raw(&path)?;

        let mut events = Vec::new();
        for line in content.split(|b| *b == b'\n') {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            events.push(serde_json::from_slice(line)?);
        }
        Ok(events)
    }

    /// Events triggered by one identity on a given day.
    pub fn search_by_user(&self, user_id: &str, date: &str) -> StorageResult<Vec<AuditEvent>> {
        let events = self.read_events(date)?;
        Ok(events
            .into_iter()
            .filter(|e| e.user_id.as_deref() == Some(user_id))
            .collect())
    }
}

/// Helper macro for logging audit events.
#[macro_export]
macro_rules! audit_log {
    ($storage:expr, $event_type:expr, $user:expr, $resource_type:expr, $resource_id:expr) => {{
        let event = $crate::storage::AuditEvent::new($event_type)
            .with_user(&$user.user_id)
            .with_resource($resource_type, $resource_id);
        $crate::storage::AuditRepository::new($storage).record(event);
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedUser, Role};
    use crate::storage::StoragePaths;
    use tempfile::TempDir;

    fn setup() -> (TempDir, DocumentStorage) {
        let temp = TempDir::new().unwrap();
        let mut storage = DocumentStorage::new(StoragePaths::new(temp.path()));
        storage.initialize().unwrap();
        (temp, storage)
    }

    fn today() -> String {
        Utc::now().format("%Y-%m-%d").to_string()
    }

    #[test]
    fn create_audit_event() {
        let event = AuditEvent::new(AuditEventType::LeadCreated)
            .with_user("user_123")
            .with_resource("lead", "lead_abc");

        assert_eq!(event.event_type, AuditEventType::LeadCreated);
        assert_eq!(event.user_id.as_deref(), Some("user_123"));
        assert_eq!(event.resource_type.as_deref(), Some("lead"));
        assert_eq!(event.resource_id.as_deref(), Some("lead_abc"));
        assert!(event.success);
    }

    #[test]
    fn failed_event() {
        let event = AuditEvent::new(AuditEventType::AuthFailure).failed("Invalid credentials");

        assert!(!event.success);
        assert_eq!(event.error.as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn log_and_read_events() {
        let (_temp, storage) = setup();
        let repo = AuditRepository::new(&storage);

        repo.log(&AuditEvent::new(AuditEventType::UserRegistered).with_user("user_1"))
            .unwrap();
        repo.log(
            &AuditEvent::new(AuditEventType::TicketDeleted)
                .with_user("admin_1")
                .with_resource("ticket", "t1"),
        )
        .unwrap();

        let events = repo.read_events(&today()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, AuditEventType::UserRegistered);
        assert_eq!(events[1].event_type, AuditEventType::TicketDeleted);
    }

    #[test]
    fn search_by_user() {
        let (_temp, storage) = setup();
        let repo = AuditRepository::new(&storage);

        repo.record(AuditEvent::new(AuditEventType::LeadCreated).with_user("user_target"));
        repo.record(AuditEvent::new(AuditEventType::LeadCreated).with_user("user_other"));

        let events = repo.search_by_user("user_target", &today()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].user_id.as_deref(), Some("user_target"));
    }

    #[test]
    fn macro_logs_with_resource() {
        let (_temp, storage) = setup();
        let user = AuthenticatedUser {
            user_id: "admin_1".into(),
            username: "root".into(),
            role: Role::Admin,
        };

        crate::audit_log!(&storage, AuditEventType::LeadDeleted, user, "lead", "lead_1");

        let events = AuditRepository::new(&storage).read_events(&today()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].resource_id.as_deref(), Some("lead_1"));
    }
}
