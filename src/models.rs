// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the REST API. JSON field names are
//! camelCase. Identity records are always converted to [`UserResponse`] or
//! [`UserSummary`] first so the password hash never leaves the server.
//! Leads, tasks and tickets are returned as views whose references (creator,
//! assignee, related lead) are resolved to summaries, or `null` when the
//! referenced record is gone.
//!
//! Required fields of create requests are modelled as `Option` so that a
//! missing field produces the specific validation message rather than a
//! generic deserialization error. Text is trimmed and blank values count as
//! missing before the `validator` rules run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::Role;
use crate::error::ApiError;
use crate::storage::repository::{
    tasks::parse_due_date, LeadSource, LeadStatus, Page, RelatedKind, RelatedTo, StoredLead,
    StoredTask, StoredTicket, StoredUser, TaskPriority, TaskStatus, TicketCategory, TicketPriority,
    TicketStatus,
};

/// Trimmed text, with blank values treated as absent.
fn present(field: Option<String>) -> Option<String> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

// =============================================================================
// Auth Models
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(required(message = "Username, email and password are required"))]
    pub username: Option<String>,
    #[validate(
        required(message = "Username, email and password are required"),
        email(message = "Invalid email format")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "Username, email and password are required"),
        length(min = 6, message = "Password must be at least 6 characters")
    )]
    pub password: Option<String>,
    pub company_name: Option<String>,
    pub phone: Option<String>,
}

/// A registration that passed input validation.
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub company_name: Option<String>,
    pub phone: Option<String>,
}

impl RegisterRequest {
    pub fn into_registration(self) -> Result<ValidRegistration, ApiError> {
        let request = Self {
            username: present(self.username),
            email: present(self.email),
            password: self.password.filter(|p| !p.is_empty()),
            ..self
        };
        request.validate()?;

        let (Some(username), Some(email), Some(password)) =
            (request.username, request.email, request.password)
        else {
            return Err(ApiError::bad_request("Username, email and password are required"));
        };

        Ok(ValidRegistration {
            username,
            email,
            password,
            company_name: request.company_name,
            phone: request.phone,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(required(message = "Email and password are required"))]
    pub email: Option<String>,
    #[validate(required(message = "Email and password are required"))]
    pub password: Option<String>,
}

impl LoginRequest {
    /// Returns `(email, password)`.
    pub fn into_credentials(self) -> Result<(String, String), ApiError> {
        let request = Self {
            email: present(self.email),
            password: self.password.filter(|p| !p.is_empty()),
        };
        request.validate()?;

        match (request.email, request.password) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => Err(ApiError::bad_request("Email and password are required")),
        }
    }
}

/// Client-facing identity. Has no password hash field by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<StoredUser> for UserResponse {
    fn from(user: StoredUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            company_name: user.company_name,
            phone: user.phone,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_users: usize,
    pub admin_users: usize,
    pub regular_users: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// Reference Summaries
// =============================================================================

/// An identity as embedded in another record (creator, assignee).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

impl From<StoredUser> for UserSummary {
    fn from(user: StoredUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            company_name: user.company_name,
        }
    }
}

/// A lead as embedded in a task's `relatedTo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeadSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl From<StoredLead> for LeadSummary {
    fn from(lead: StoredLead) -> Self {
        Self {
            id: lead.id,
            name: lead.name,
            email: lead.email,
            phone: lead.phone,
            company: lead.company,
        }
    }
}

// =============================================================================
// Listing Models
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> From<&Page<T>> for Pagination {
    fn from(page: &Page<T>) -> Self {
        Self {
            current_page: page.page,
            total_pages: page.total_pages(),
            total: page.total,
            has_next: page.has_next(),
            has_prev: page.has_prev(),
        }
    }
}

// =============================================================================
// Lead Models
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadRequest {
    #[validate(required(message = "Name, email and phone are required"))]
    pub name: Option<String>,
    #[validate(required(message = "Name, email and phone are required"))]
    pub email: Option<String>,
    #[validate(required(message = "Name, email and phone are required"))]
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: Option<LeadSource>,
    pub status: Option<LeadStatus>,
    pub notes: Option<String>,
    pub next_follow_up: Option<DateTime<Utc>>,
}

impl CreateLeadRequest {
    pub fn into_lead(self, created_by: &str) -> Result<StoredLead, ApiError> {
        let request = Self {
            name: present(self.name),
            email: present(self.email),
            phone: present(self.phone),
            ..self
        };
        request.validate()?;

        let (Some(name), Some(email), Some(phone)) = (request.name, request.email, request.phone)
        else {
            return Err(ApiError::bad_request("Name, email and phone are required"));
        };

        let now = Utc::now();
        Ok(StoredLead {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            email,
            phone,
            company: request.company,
            source: request.source.unwrap_or_default(),
            status: request.status.unwrap_or_default(),
            notes: request.notes,
            last_contacted: None,
            next_follow_up: request.next_follow_up,
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
        })
    }
}

/// A lead with its creator resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub source: LeadSource,
    pub status: LeadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_contacted: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_follow_up: Option<DateTime<Utc>>,
    pub created_by: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeadView {
    pub fn new(lead: StoredLead, created_by: Option<UserSummary>) -> Self {
        Self {
            id: lead.id,
            name: lead.name,
            email: lead.email,
            phone: lead.phone,
            company: lead.company,
            source: lead.source,
            status: lead.status,
            notes: lead.notes,
            last_contacted: lead.last_contacted,
            next_follow_up: lead.next_follow_up,
            created_by,
            created_at: lead.created_at,
            updated_at: lead.updated_at,
        }
    }
}

/// Single lead, with a confirmation message on create and update.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeadResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub lead: LeadView,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeadListResponse {
    pub leads: Vec<LeadView>,
    pub pagination: Pagination,
}

// =============================================================================
// Task Models
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(required(message = "Title and due date are required"))]
    pub title: Option<String>,
    pub description: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`.
    #[validate(required(message = "Title and due date are required"))]
    pub due_date: Option<String>,
    pub priority: Option<TaskPriority>,
    pub related_to: Option<RelatedTo>,
}

impl CreateTaskRequest {
    /// New tasks always start `pending`.
    pub fn into_task(self, created_by: &str) -> Result<StoredTask, ApiError> {
        let request = Self {
            title: present(self.title),
            due_date: present(self.due_date),
            ..self
        };
        request.validate()?;

        let (Some(title), Some(raw_due)) = (request.title, request.due_date) else {
            return Err(ApiError::bad_request("Title and due date are required"));
        };
        let due_date =
            parse_due_date(&raw_due).ok_or_else(|| ApiError::bad_request("Invalid due date"))?;

        let now = Utc::now();
        Ok(StoredTask {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            description: request.description,
            due_date,
            priority: request.priority.unwrap_or_default(),
            status: TaskStatus::default(),
            related_to: request.related_to.filter(|r| !r.id.trim().is_empty()),
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
        })
    }
}

/// A task's `relatedTo` with the referenced lead resolved under `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RelatedView {
    #[serde(rename = "type")]
    pub kind: RelatedKind,
    /// The related lead, or `null` when it is gone or not visible.
    #[serde(rename = "id")]
    pub lead: Option<LeadSummary>,
}

/// A task with its creator and related lead resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_to: Option<RelatedView>,
    pub created_by: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskView {
    pub fn new(task: StoredTask, created_by: Option<UserSummary>, related_to: Option<RelatedView>) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            due_date: task.due_date,
            priority: task.priority,
            status: task.status,
            related_to,
            created_by,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub task: TaskView,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskView>,
    pub pagination: Pagination,
}

// =============================================================================
// Ticket Models
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct CreateTicketRequest {
    #[validate(required(message = "Title, description and category are required"))]
    pub title: Option<String>,
    #[validate(required(message = "Title, description and category are required"))]
    pub description: Option<String>,
    pub priority: Option<TicketPriority>,
    #[validate(required(message = "Title, description and category are required"))]
    pub category: Option<TicketCategory>,
    pub attachments: Option<Vec<String>>,
}

impl CreateTicketRequest {
    /// New tickets always start `open` and unassigned.
    pub fn into_ticket(self, created_by: &str) -> Result<StoredTicket, ApiError> {
        let request = Self {
            title: present(self.title),
            description: present(self.description),
            ..self
        };
        request.validate()?;

        let (Some(title), Some(description), Some(category)) =
            (request.title, request.description, request.category)
        else {
            return Err(ApiError::bad_request(
                "Title, description and category are required",
            ));
        };

        let now = Utc::now();
        Ok(StoredTicket {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            description,
            status: TicketStatus::default(),
            priority: request.priority.unwrap_or_default(),
            category,
            assigned_to: None,
            attachments: request.attachments.unwrap_or_default(),
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
        })
    }
}

/// A ticket with its creator and assignee resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub category: TicketCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserSummary>,
    pub attachments: Vec<String>,
    pub created_by: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TicketView {
    pub fn new(ticket: StoredTicket, created_by: Option<UserSummary>, assigned_to: Option<UserSummary>) -> Self {
        Self {
            id: ticket.id,
            title: ticket.title,
            description: ticket.description,
            status: ticket.status,
            priority: ticket.priority,
            category: ticket.category,
            assigned_to,
            attachments: ticket.attachments,
            created_by,
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TicketResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub ticket: TicketView,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TicketListResponse {
    pub tickets: Vec<TicketView>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::repository::paginate;
    use axum::http::StatusCode;

    fn registration() -> RegisterRequest {
        RegisterRequest {
            username: Some("alice".into()),
            email: Some("alice@example.com".into()),
            password: Some("secret1".into()),
            ..Default::default()
        }
    }

    fn stored_user() -> StoredUser {
        let now = Utc::now();
        StoredUser {
            id: "id".into(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "$2b$10$secret".into(),
            role: Role::Admin,
            company_name: Some("Acme".into()),
            phone: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn register_validation_messages() {
        let missing = RegisterRequest {
            password: None,
            ..registration()
        };
        assert_eq!(
            missing.into_registration().unwrap_err().message,
            "Username, email and password are required"
        );

        let bad_email = RegisterRequest {
            email: Some("not-an-email".into()),
            ..registration()
        };
        assert_eq!(bad_email.into_registration().unwrap_err().message, "Invalid email format");

        let short = RegisterRequest {
            password: Some("12345".into()),
            ..registration()
        };
        let err = short.into_registration().unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Password must be at least 6 characters");

        let ok = registration().into_registration().unwrap();
        assert_eq!(ok.username, "alice");
    }

    #[test]
    fn missing_field_outranks_other_violations() {
        let request = RegisterRequest {
            username: Some("   ".into()),
            email: Some("not-an-email".into()),
            password: Some("123".into()),
            ..Default::default()
        };
        assert_eq!(
            request.into_registration().unwrap_err().message,
            "Username, email and password are required"
        );

        let request = RegisterRequest {
            email: Some("not-an-email".into()),
            password: Some("123".into()),
            ..registration()
        };
        assert_eq!(request.into_registration().unwrap_err().message, "Invalid email format");
    }

    #[test]
    fn email_format() {
        for valid in ["a@b.co", "first.last@mail.example.org", "  padded@example.com "] {
            let request = RegisterRequest {
                email: Some(valid.into()),
                ..registration()
            };
            assert!(request.into_registration().is_ok(), "{valid}");
        }
        for invalid in ["@b.co", "a@@b.co", "a b@c.de", "plain"] {
            let request = RegisterRequest {
                email: Some(invalid.into()),
                ..registration()
            };
            assert_eq!(
                request.into_registration().unwrap_err().message,
                "Invalid email format",
                "{invalid}"
            );
        }
    }

    #[test]
    fn login_requires_both_fields() {
        let err = LoginRequest {
            email: Some("a@b.co".into()),
            password: None,
        }
        .into_credentials()
        .unwrap_err();
        assert_eq!(err.message, "Email and password are required");

        let err = LoginRequest {
            email: Some("  ".into()),
            password: Some("secret1".into()),
        }
        .into_credentials()
        .unwrap_err();
        assert_eq!(err.message, "Email and password are required");
    }

    #[test]
    fn user_response_has_no_hash() {
        let json = serde_json::to_string(&UserResponse::from(stored_user())).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("$2b$"));
        assert!(json.contains(r#""role":"admin""#));

        let summary = serde_json::to_value(UserSummary::from(stored_user())).unwrap();
        assert_eq!(
            summary,
            serde_json::json!({
                "id": "id",
                "username": "alice",
                "email": "alice@example.com",
                "companyName": "Acme",
            })
        );
    }

    #[test]
    fn create_requests_apply_defaults() {
        let lead = CreateLeadRequest {
            name: Some(" Ada ".into()),
            email: Some("ada@example.com".into()),
            phone: Some("555".into()),
            ..Default::default()
        }
        .into_lead("u1")
        .unwrap();
        assert_eq!(lead.name, "Ada");
        assert_eq!(lead.source, LeadSource::Website);
        assert_eq!(lead.status, LeadStatus::New);
        assert_eq!(lead.created_by, "u1");

        let task = CreateTaskRequest {
            title: Some("Call".into()),
            due_date: Some("2030-05-01".into()),
            ..Default::default()
        }
        .into_task("u1")
        .unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::Medium);

        let ticket = CreateTicketRequest {
            title: Some("Broken".into()),
            description: Some("It broke".into()),
            category: Some(TicketCategory::Bug),
            ..Default::default()
        }
        .into_ticket("u1")
        .unwrap();
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.priority, TicketPriority::Medium);
        assert!(ticket.assigned_to.is_none());
    }

    #[test]
    fn create_requests_report_missing_fields() {
        let err = CreateLeadRequest {
            name: Some("Ada".into()),
            email: Some("  ".into()),
            phone: Some("555".into()),
            ..Default::default()
        }
        .into_lead("u1")
        .unwrap_err();
        assert_eq!(err.message, "Name, email and phone are required");

        let err = CreateTaskRequest {
            title: Some("Call".into()),
            ..Default::default()
        }
        .into_task("u1")
        .unwrap_err();
        assert_eq!(err.message, "Title and due date are required");

        let err = CreateTicketRequest {
            title: Some("Broken".into()),
            description: Some("It broke".into()),
            ..Default::default()
        }
        .into_ticket("u1")
        .unwrap_err();
        assert_eq!(err.message, "Title, description and category are required");
    }

    #[test]
    fn related_view_nests_lead_under_id() {
        let view = RelatedView {
            kind: RelatedKind::Lead,
            lead: None,
        };
        assert_eq!(
            serde_json::to_value(view).unwrap(),
            serde_json::json!({ "type": "lead", "id": null })
        );
    }

    #[test]
    fn pagination_from_page() {
        let page = paginate((0..15).collect::<Vec<_>>(), Some(2), Some(10));
        let pagination = Pagination::from(&page);
        assert_eq!(
            pagination,
            Pagination {
                current_page: 2,
                total_pages: 2,
                total: 15,
                has_next: false,
                has_prev: true,
            }
        );
    }
}
