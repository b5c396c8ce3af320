// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Reference resolution for response bodies.
//!
//! Records store bare ids for their creator, assignee and related lead. Before
//! a record is returned those ids are replaced by summaries. An id whose
//! record no longer exists resolves to `null`, and so does a related lead the
//! viewer is not allowed to see.

use std::collections::HashMap;

use crate::{
    auth::AuthenticatedUser,
    models::{LeadSummary, LeadView, RelatedView, TaskView, TicketView, UserSummary},
    storage::{
        DocumentStorage, LeadRepository, OwnershipCheck, StorageError, StorageResult, StoredLead,
        StoredTask, StoredTicket, UserRepository,
    },
};

/// Resolves references on behalf of one caller, caching identity lookups
/// for the lifetime of a single response.
pub struct References<'a> {
    viewer: &'a AuthenticatedUser,
    storage: &'a DocumentStorage,
    users: HashMap<String, Option<UserSummary>>,
}

fn found<T>(result: StorageResult<T>) -> StorageResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(StorageError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

impl<'a> References<'a> {
    pub fn new(viewer: &'a AuthenticatedUser, storage: &'a DocumentStorage) -> Self {
        Self {
            viewer,
            storage,
            users: HashMap::new(),
        }
    }

    pub fn user(&mut self, user_id: &str) -> StorageResult<Option<UserSummary>> {
        if let Some(cached) = self.users.get(user_id) {
            return Ok(cached.clone());
        }
        let summary = found(UserRepository::new(self.storage).find_by_id(user_id))?.map(UserSummary::from);
        self.users.insert(user_id.to_string(), summary.clone());
        Ok(summary)
    }

    pub fn lead(&self, lead_id: &str) -> StorageResult<Option<LeadSummary>> {
        let lead = LeadRepository::new(self.storage).get(lead_id).visible_to(self.viewer);
        Ok(found(lead)?.map(LeadSummary::from))
    }

    pub fn lead_view(&mut self, lead: StoredLead) -> StorageResult<LeadView> {
        let created_by = self.user(&lead.created_by)?;
        Ok(LeadView::new(lead, created_by))
    }

    pub fn task_view(&mut self, task: StoredTask) -> StorageResult<TaskView> {
        let created_by = self.user(&task.created_by)?;
        let related_to = match &task.related_to {
            Some(related) => Some(RelatedView {
                kind: related.kind,
                lead: self.lead(&related.id)?,
            }),
            None => None,
        };
        Ok(TaskView::new(task, created_by, related_to))
    }

    pub fn ticket_view(&mut self, ticket: StoredTicket) -> StorageResult<TicketView> {
        let created_by = self.user(&ticket.created_by)?;
        let assigned_to = match &ticket.assigned_to {
            Some(assignee) => self.user(assignee)?.map(|mut summary| {
                summary.company_name = None;
                summary
            }),
            None => None,
        };
        Ok(TicketView::new(ticket, created_by, assigned_to))
    }

    pub fn lead_views(&mut self, leads: Vec<StoredLead>) -> StorageResult<Vec<LeadView>> {
        leads.into_iter().map(|lead| self.lead_view(lead)).collect()
    }

    pub fn task_views(&mut self, tasks: Vec<StoredTask>) -> StorageResult<Vec<TaskView>> {
        tasks.into_iter().map(|task| self.task_view(task)).collect()
    }

    pub fn ticket_views(&mut self, tickets: Vec<StoredTicket>) -> StorageResult<Vec<TicketView>> {
        tickets.into_iter().map(|ticket| self.ticket_view(ticket)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{seed_user, test_state};
    use crate::auth::Role;
    use crate::models::CreateLeadRequest;
    use crate::storage::repository::{RelatedKind, RelatedTo, TaskPriority, TaskStatus};
    use chrono::Utc;

    fn stored_lead(owner: &str) -> StoredLead {
        CreateLeadRequest {
            name: Some("Ada".into()),
            email: Some("ada@example.com".into()),
            phone: Some("555".into()),
            company: Some("Engines".into()),
            ..Default::default()
        }
        .into_lead(owner)
        .unwrap()
    }

    fn task_related_to(owner: &str, lead_id: &str) -> StoredTask {
        let now = Utc::now();
        StoredTask {
            id: uuid::Uuid::new_v4().to_string(),
            title: "Call".into(),
            description: None,
            due_date: now,
            priority: TaskPriority::Medium,
            status: TaskStatus::Pending,
            related_to: Some(RelatedTo {
                kind: RelatedKind::Lead,
                id: lead_id.to_string(),
            }),
            created_by: owner.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn missing_creator_resolves_to_null() {
        let (_temp, state) = test_state();
        let alice = seed_user(&state, "alice", Role::User);
        let storage = state.storage();
        let mut references = References::new(&alice, &storage);

        let view = references.lead_view(stored_lead(&alice.user_id)).unwrap();
        assert_eq!(view.created_by.unwrap().username, "alice");

        let orphan = references
            .lead_view(stored_lead(&uuid::Uuid::new_v4().to_string()))
            .unwrap();
        assert!(orphan.created_by.is_none());
        assert!(serde_json::to_value(&orphan).unwrap()["createdBy"].is_null());
    }

    #[tokio::test]
    async fn related_lead_follows_visibility() {
        let (_temp, state) = test_state();
        let admin = seed_user(&state, "root", Role::Admin);
        let alice = seed_user(&state, "alice", Role::User);
        let bob = seed_user(&state, "bob", Role::User);
        let storage = state.storage();

        let lead = stored_lead(&alice.user_id);
        LeadRepository::new(&storage).create(&lead).unwrap();

        let own = References::new(&alice, &storage)
            .task_view(task_related_to(&alice.user_id, &lead.id))
            .unwrap();
        let related = own.related_to.unwrap();
        assert_eq!(related.kind, RelatedKind::Lead);
        assert_eq!(related.lead.unwrap().company.as_deref(), Some("Engines"));

        let foreign = References::new(&bob, &storage)
            .task_view(task_related_to(&bob.user_id, &lead.id))
            .unwrap();
        assert!(foreign.related_to.unwrap().lead.is_none());

        let seen_by_admin = References::new(&admin, &storage)
            .task_view(task_related_to(&bob.user_id, &lead.id))
            .unwrap();
        assert_eq!(seen_by_admin.related_to.unwrap().lead.unwrap().name, "Ada");
    }
}
