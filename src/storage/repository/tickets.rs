// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Support ticket repository.
//!
//! Each ticket is stored as a separate JSON file under `tickets/`. Tickets
//! carry two workflow fields, `status` and `assignedTo`, that only admins
//! may change.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{count_by, explicit_null, not_blank, CountBucket, Document, Filter, OwnedRepository};
use crate::storage::{OwnedResource, RestrictedFields, ScopedQuery, StoragePaths, StorageResult};

/// How far back `recentTickets` looks.
const RECENT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in-progress",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TicketCategory {
    Technical,
    Billing,
    FeatureRequest,
    Bug,
    Other,
}

impl TicketCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketCategory::Technical => "technical",
            TicketCategory::Billing => "billing",
            TicketCategory::FeatureRequest => "feature-request",
            TicketCategory::Bug => "bug",
            TicketCategory::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredTicket {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(default)]
    pub priority: TicketPriority,
    pub category: TicketCategory,
    /// Identity ID of the assignee; not subject to ownership.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for StoredTicket {
    fn created_by(&self) -> &str {
        &self.created_by
    }

    fn kind() -> &'static str {
        "Ticket"
    }
}

impl Document for StoredTicket {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_dir(paths: &StoragePaths) -> PathBuf {
        paths.tickets_dir()
    }

    fn document_path(paths: &StoragePaths, id: &str) -> PathBuf {
        paths.ticket(id)
    }
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TicketUpdate {
    #[validate(custom(function = "not_blank", message = "Title and description cannot be empty"))]
    pub title: Option<String>,
    #[validate(custom(function = "not_blank", message = "Title and description cannot be empty"))]
    pub description: Option<String>,
    pub priority: Option<TicketPriority>,
    pub category: Option<TicketCategory>,
    pub attachments: Option<Vec<String>>,
    /// Admin only; dropped from other callers' updates.
    pub status: Option<TicketStatus>,
    /// Admin only; dropped from other callers' updates. `null` unassigns.
    #[serde(default, deserialize_with = "explicit_null")]
    #[schema(value_type = Option<String>)]
    pub assigned_to: Option<Option<String>>,
}

impl RestrictedFields for TicketUpdate {
    fn strip_restricted(&mut self) {
        self.status = None;
        self.assigned_to = None;
    }
}

impl StoredTicket {
    pub fn apply(&mut self, update: TicketUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(attachments) = update.attachments {
            self.attachments = attachments;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(assigned_to) = update.assigned_to {
            self.assigned_to = assigned_to;
        }
        self.updated_at = Utc::now();
    }
}

/// Listing filter for tickets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketQuery {
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub category: Option<TicketCategory>,
    pub created_by: Option<String>,
}

impl ScopedQuery for TicketQuery {
    fn restrict_to_owner(mut self, owner_id: &str) -> Self {
        self.created_by = Some(owner_id.to_string());
        self
    }
}

impl Filter<StoredTicket> for TicketQuery {
    fn matches(&self, ticket: &StoredTicket) -> bool {
        self.status.is_none_or(|s| ticket.status == s)
            && self.priority.is_none_or(|p| ticket.priority == p)
            && self.category.is_none_or(|c| ticket.category == c)
            && self.created_by.as_deref().is_none_or(|o| ticket.created_by == o)
    }
}

/// Store-wide ticket statistics for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketStats {
    pub total_tickets: usize,
    pub open_tickets: usize,
    pub in_progress_tickets: usize,
    pub resolved_tickets: usize,
    pub urgent_tickets: usize,
    /// Created within the last seven days.
    pub recent_tickets: usize,
    pub tickets_by_category: Vec<CountBucket>,
    pub tickets_by_status: Vec<CountBucket>,
}

pub type TicketRepository<'a> = OwnedRepository<'a, StoredTicket>;

impl OwnedRepository<'_, StoredTicket> {
    /// Tickets matching `query`, newest first.
    pub fn list(&self, query: &TicketQuery) -> StorageResult<Vec<StoredTicket>> {
        let mut tickets = self.find(query)?;
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tickets)
    }

    pub fn stats(&self) -> StorageResult<TicketStats> {
        let tickets = self.list_all()?;
        let with_status = |status: TicketStatus| tickets.iter().filter(|t| t.status == status).count();
        let recent_cutoff = Utc::now() - Duration::days(RECENT_WINDOW_DAYS);

        Ok(TicketStats {
            total_tickets: tickets.len(),
            open_tickets: with_status(TicketStatus::Open),
            in_progress_tickets: with_status(TicketStatus::InProgress),
            resolved_tickets: with_status(TicketStatus::Resolved),
            urgent_tickets: tickets
                .iter()
                .filter(|t| t.priority == TicketPriority::Urgent)
                .count(),
            recent_tickets: tickets
                .iter()
                .filter(|t| t.created_at >= recent_cutoff)
                .count(),
            tickets_by_category: count_by(&tickets, |t| t.category.as_str()),
            tickets_by_status: count_by(&tickets, |t| t.status.as_str()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedUser, Role};
    use crate::storage::{DocumentStorage, OwnershipFilter};
    use tempfile::TempDir;

    fn setup() -> (TempDir, DocumentStorage) {
        let temp = TempDir::new().unwrap();
        let mut storage = DocumentStorage::new(StoragePaths::new(temp.path()));
        storage.initialize().unwrap();
        (temp, storage)
    }

    fn ticket(owner: &str, category: TicketCategory, age_days: i64) -> StoredTicket {
        let created = Utc::now() - Duration::days(age_days);
        StoredTicket {
            id: uuid::Uuid::new_v4().to_string(),
            title: "Printer on fire".into(),
            description: "Smoke everywhere".into(),
            status: TicketStatus::Open,
            priority: TicketPriority::Medium,
            category,
            assigned_to: None,
            attachments: Vec::new(),
            created_by: owner.into(),
            created_at: created,
            updated_at: created,
        }
    }

    fn caller(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: "u1".into(),
            username: "u1".into(),
            role,
        }
    }

    fn escalation() -> TicketUpdate {
        TicketUpdate {
            title: Some("Printer still on fire".into()),
            status: Some(TicketStatus::Closed),
            assigned_to: Some(Some("helpdesk".into())),
            ..Default::default()
        }
    }

    #[test]
    fn non_admin_update_drops_workflow_fields() {
        let mut t = ticket("u1", TicketCategory::Technical, 0);
        let mut update = escalation();
        OwnershipFilter::strip_restricted_fields(&caller(Role::User), &mut update);
        t.apply(update);

        assert_eq!(t.title, "Printer still on fire");
        assert_eq!(t.status, TicketStatus::Open);
        assert_eq!(t.assigned_to, None);
    }

    #[test]
    fn admin_update_applies_workflow_fields() {
        let mut t = ticket("u1", TicketCategory::Technical, 0);
        let mut update = escalation();
        OwnershipFilter::strip_restricted_fields(&caller(Role::Admin), &mut update);
        t.apply(update);

        assert_eq!(t.status, TicketStatus::Closed);
        assert_eq!(t.assigned_to.as_deref(), Some("helpdesk"));
    }

    #[test]
    fn explicit_null_unassigns_and_absent_keeps() {
        let mut t = ticket("u1", TicketCategory::Technical, 0);
        t.assigned_to = Some("helpdesk".into());

        let absent: TicketUpdate = serde_json::from_value(serde_json::json!({ "title": "x" })).unwrap();
        assert_eq!(absent.assigned_to, None);
        t.apply(absent);
        assert_eq!(t.assigned_to.as_deref(), Some("helpdesk"));

        let cleared: TicketUpdate = serde_json::from_value(serde_json::json!({ "assignedTo": null })).unwrap();
        assert_eq!(cleared.assigned_to, Some(None));
        t.apply(cleared);
        assert_eq!(t.assigned_to, None);
    }

    #[test]
    fn update_rejects_blank_title_or_description() {
        let blank: TicketUpdate =
            serde_json::from_value(serde_json::json!({ "title": "", "description": "" })).unwrap();
        let errors = blank.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
        assert!(errors.field_errors().contains_key("description"));
    }

    #[test]
    fn list_filters_by_category_and_owner() {
        let (_temp, storage) = setup();
        let repo = TicketRepository::new(&storage);
        repo.create(&ticket("u1", TicketCategory::Bug, 0)).unwrap();
        repo.create(&ticket("u1", TicketCategory::Billing, 0)).unwrap();
        repo.create(&ticket("u2", TicketCategory::Bug, 0)).unwrap();

        let bugs = repo
            .list(&TicketQuery {
                category: Some(TicketCategory::Bug),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(bugs.len(), 2);

        let mine = repo
            .list(&TicketQuery::default().restrict_to_owner("u1"))
            .unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|t| t.created_by == "u1"));
    }

    #[test]
    fn stats_cover_whole_store() {
        let (_temp, storage) = setup();
        let repo = TicketRepository::new(&storage);

        let mut urgent = ticket("u1", TicketCategory::Bug, 0);
        urgent.priority = TicketPriority::Urgent;
        repo.create(&urgent).unwrap();

        let mut resolved = ticket("u2", TicketCategory::Bug, 10);
        resolved.status = TicketStatus::Resolved;
        repo.create(&resolved).unwrap();

        let mut working = ticket("u2", TicketCategory::FeatureRequest, 1);
        working.status = TicketStatus::InProgress;
        repo.create(&working).unwrap();

        let stats = repo.stats().unwrap();
        assert_eq!(stats.total_tickets, 3);
        assert_eq!(stats.open_tickets, 1);
        assert_eq!(stats.in_progress_tickets, 1);
        assert_eq!(stats.resolved_tickets, 1);
        assert_eq!(stats.urgent_tickets, 1);
        assert_eq!(stats.recent_tickets, 2);
        assert_eq!(
            stats.tickets_by_category,
            vec![
                CountBucket {
                    id: "bug".into(),
                    count: 2
                },
                CountBucket {
                    id: "feature-request".into(),
                    count: 1
                },
            ]
        );
        assert_eq!(stats.tickets_by_status.len(), 3);
    }

    #[test]
    fn wire_names_are_kebab_case() {
        let json = serde_json::to_value(ticket("u1", TicketCategory::FeatureRequest, 0)).unwrap();
        assert_eq!(json["category"], "feature-request");
        assert_eq!(json["status"], "open");
        assert_eq!(json["createdBy"], "u1");
        assert!(json.get("assignedTo").is_none());

        let err = serde_json::from_value::<TicketUpdate>(serde_json::json!({ "status": "escalated" }));
        assert!(err.is_err());
    }
}
