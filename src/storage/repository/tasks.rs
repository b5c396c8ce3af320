// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Task repository.
//!
//! Each task is stored as a separate JSON file under `tasks/`.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{count_by, not_blank, CountBucket, Document, Filter, OwnedRepository};
use crate::storage::{OwnedResource, ScopedQuery, StoragePaths, StorageResult};

/// Task priority. Variant order is the sort order (low < medium < high).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    /// Whether the task still counts towards overdue work.
    pub fn is_open(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::InProgress)
    }
}

/// Kind of record a task refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RelatedKind {
    Lead,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RelatedTo {
    #[serde(rename = "type")]
    pub kind: RelatedKind,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredTask {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_to: Option<RelatedTo>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for StoredTask {
    fn created_by(&self) -> &str {
        &self.created_by
    }

    fn kind() -> &'static str {
        "Task"
    }
}

impl Document for StoredTask {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_dir(paths: &StoragePaths) -> PathBuf {
        paths.tasks_dir()
    }

    fn document_path(paths: &StoragePaths, id: &str) -> PathBuf {
        paths.task(id)
    }
}

/// Accept either an RFC 3339 timestamp or a bare `YYYY-MM-DD` date
/// (interpreted as midnight UTC).
pub fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[validate(custom(function = "not_blank", message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`.
    pub due_date: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub related_to: Option<RelatedTo>,
}

impl StoredTask {
    /// Apply a partial update. Fails with the offending value when
    /// `due_date` cannot be parsed; the task is left untouched in that case.
    pub fn apply(&mut self, update: TaskUpdate) -> Result<(), String> {
        let due_date = match update.due_date {
            Some(raw) => Some(parse_due_date(&raw).ok_or(raw)?),
            None => None,
        };

        if let Some(title) = update.title {
            self.title = title;
        }
        if update.description.is_some() {
            self.description = update.description;
        }
        if let Some(due_date) = due_date {
            self.due_date = due_date;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if update.related_to.is_some() {
            self.related_to = update.related_to;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status.is_open() && self.due_date < now
    }
}

/// Listing filter for tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub created_by: Option<String>,
}

impl ScopedQuery for TaskQuery {
    fn restrict_to_owner(mut self, owner_id: &str) -> Self {
        self.created_by = Some(owner_id.to_string());
        self
    }
}

impl Filter<StoredTask> for TaskQuery {
    fn matches(&self, task: &StoredTask) -> bool {
        self.status.is_none_or(|s| task.status == s)
            && self.priority.is_none_or(|p| task.priority == p)
            && self.created_by.as_deref().is_none_or(|o| task.created_by == o)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total_tasks: usize,
    pub overdue_tasks: usize,
    pub tasks_by_status: Vec<CountBucket>,
    pub tasks_by_priority: Vec<CountBucket>,
}

pub type TaskRepository<'a> = OwnedRepository<'a, StoredTask>;

impl OwnedRepository<'_, StoredTask> {
    /// Tasks matching `query`, earliest due date first, then highest priority.
    pub fn list(&self, query: &TaskQuery) -> StorageResult<Vec<StoredTask>> {
        let mut tasks = self.find(query)?;
        tasks.sort_by(|a, b| {
            a.due_date
                .cmp(&b.due_date)
                .then_with(|| b.priority.cmp(&a.priority))
        });
        Ok(tasks)
    }

    pub fn stats(&self, query: &TaskQuery) -> StorageResult<TaskStats> {
        let tasks = self.find(query)?;
        let now = Utc::now();
        Ok(TaskStats {
            total_tasks: tasks.len(),
            overdue_tasks: tasks.iter().filter(|t| t.is_overdue(now)).count(),
            tasks_by_status: count_by(&tasks, |t| t.status.as_str()),
            tasks_by_priority: count_by(&tasks, |t| t.priority.as_str()),
        })
    }
}
