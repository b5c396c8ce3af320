// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Lead repository.
//!
//! Each lead is stored as a separate JSON file under `leads/`.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{count_by, not_blank, CountBucket, Document, Filter, OwnedRepository};
use crate::storage::{OwnedResource, ScopedQuery, StoragePaths, StorageResult};

/// Where a lead came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LeadSource {
    #[default]
    Website,
    Referral,
    Social,
    Direct,
    Other,
}

impl LeadSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadSource::Website => "website",
            LeadSource::Referral => "referral",
            LeadSource::Social => "social",
            LeadSource::Direct => "direct",
            LeadSource::Other => "other",
        }
    }
}

/// Sales pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Lost,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Lost => "lost",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredLead {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default)]
    pub source: LeadSource,
    #[serde(default)]
    pub status: LeadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_contacted: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_follow_up: Option<DateTime<Utc>>,
    /// Identity ID of the creator; never changed after creation.
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for StoredLead {
    fn created_by(&self) -> &str {
        &self.created_by
    }

    fn kind() -> &'static str {
        "Lead"
    }
}

impl Document for StoredLead {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_dir(paths: &StoragePaths) -> PathBuf {
        paths.leads_dir()
    }

    fn document_path(paths: &StoragePaths, id: &str) -> PathBuf {
        paths.lead(id)
    }
}

/// Partial update; absent fields are left unchanged. Required fields may be
/// replaced but never blanked.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LeadUpdate {
    #[validate(custom(function = "not_blank", message = "Name, email and phone cannot be empty"))]
    pub name: Option<String>,
    #[validate(custom(function = "not_blank", message = "Name, email and phone cannot be empty"))]
    pub email: Option<String>,
    #[validate(custom(function = "not_blank", message = "Name, email and phone cannot be empty"))]
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: Option<LeadSource>,
    pub status: Option<LeadStatus>,
    pub notes: Option<String>,
    pub last_contacted: Option<DateTime<Utc>>,
    pub next_follow_up: Option<DateTime<Utc>>,
}

impl StoredLead {
    pub fn apply(&mut self, update: LeadUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if update.company.is_some() {
            self.company = update.company;
        }
        if let Some(source) = update.source {
            self.source = source;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if update.notes.is_some() {
            self.notes = update.notes;
        }
        if update.last_contacted.is_some() {
            self.last_contacted = update.last_contacted;
        }
        if update.next_follow_up.is_some() {
            self.next_follow_up = update.next_follow_up;
        }
        self.updated_at = Utc::now();
    }
}

/// Listing filter for leads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadQuery {
    pub status: Option<LeadStatus>,
    pub source: Option<LeadSource>,
    pub created_by: Option<String>,
}

impl ScopedQuery for LeadQuery {
    fn restrict_to_owner(mut self, owner_id: &str) -> Self {
        self.created_by = Some(owner_id.to_string());
        self
    }
}

impl Filter<StoredLead> for LeadQuery {
    fn matches(&self, lead: &StoredLead) -> bool {
        self.status.is_none_or(|s| lead.status == s)
            && self.source.is_none_or(|s| lead.source == s)
            && self.created_by.as_deref().is_none_or(|o| lead.created_by == o)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadStats {
    pub total_leads: usize,
    pub leads_by_status: Vec<CountBucket>,
    pub leads_by_source: Vec<CountBucket>,
}

pub type LeadRepository<'a> = OwnedRepository<'a, StoredLead>;

impl OwnedRepository<'_, StoredLead> {
    /// Leads matching `query`, newest first.
    pub fn list(&self, query: &LeadQuery) -> StorageResult<Vec<StoredLead>> {
        let mut leads = self.find(query)?;
        leads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(leads)
    }

    pub fn stats(&self, query: &LeadQuery) -> StorageResult<LeadStats> {
        let leads = self.find(query)?;
        Ok(LeadStats {
            total_leads: leads.len(),
            leads_by_status: count_by(&leads, |l| l.status.as_str()),
            leads_by_source: count_by(&leads, |l| l.source.as_str()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DocumentStorage, StorageError};
    use chrono::Duration;
    use tempfile::TempDir;

    fn setup() -> (TempDir, DocumentStorage) {
        let temp = TempDir::new().unwrap();
        let mut storage = DocumentStorage::new(StoragePaths::new(temp.path()));
        storage.initialize().unwrap();
        (temp, storage)
    }

    fn lead(owner: &str, status: LeadStatus, age_minutes: i64) -> StoredLead {
        let created = Utc::now() - Duration::minutes(age_minutes);
        StoredLead {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            phone: "555-0100".into(),
            company: None,
            source: LeadSource::default(),
            status,
            notes: None,
            last_contacted: None,
            next_follow_up: None,
            created_by: owner.into(),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn create_get_delete() {
        let (_temp, storage) = setup();
        let repo = LeadRepository::new(&storage);
        let l = lead("u1", LeadStatus::New, 0);

        repo.create(&l).unwrap();
        assert!(repo.exists(&l.id));
        assert_eq!(repo.get(&l.id).unwrap(), l);
        assert!(matches!(repo.create(&l), Err(StorageError::Duplicate(_))));

        repo.delete(&l.id).unwrap();
        assert!(matches!(repo.get(&l.id), Err(StorageError::NotFound(_))));
        assert!(matches!(repo.delete(&l.id), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn malformed_id_is_not_found() {
        let (_temp, storage) = setup();
        let repo = LeadRepository::new(&storage);
        assert!(matches!(repo.get("../users/x"), Err(StorageError::NotFound(_))));
        assert!(!repo.exists("../users/x"));
    }

    #[test]
    fn apply_keeps_creator_and_touches_timestamp() {
        let mut l = lead("u1", LeadStatus::New, 5);
        let before = l.updated_at;

        l.apply(LeadUpdate {
            status: Some(LeadStatus::Qualified),
            notes: Some("called back".into()),
            ..Default::default()
        });

        assert_eq!(l.status, LeadStatus::Qualified);
        assert_eq!(l.notes.as_deref(), Some("called back"));
        assert_eq!(l.name, "Ada");
        assert_eq!(l.created_by, "u1");
        assert!(l.updated_at > before);
    }

    #[test]
    fn update_rejects_blank_required_fields() {
        let blank = LeadUpdate {
            name: Some("".into()),
            phone: Some("   ".into()),
            ..Default::default()
        };
        let errors = blank.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("phone"));
        assert!(!fields.contains_key("email"));

        let partial = LeadUpdate {
            notes: Some(String::new()),
            ..Default::default()
        };
        assert!(partial.validate().is_ok());
    }

    #[test]
    fn list_filters_and_sorts_newest_first() {
        let (_temp, storage) = setup();
        let repo = LeadRepository::new(&storage);
        let old = lead("u1", LeadStatus::New, 30);
        let new = lead("u1", LeadStatus::New, 1);
        let lost = lead("u1", LeadStatus::Lost, 10);
        let foreign = lead("u2", LeadStatus::New, 2);
        for l in [&old, &new, &lost, &foreign] {
            repo.create(l).unwrap();
        }

        let mine = repo
            .list(&LeadQuery::default().restrict_to_owner("u1"))
            .unwrap();
        assert_eq!(
            mine.iter().map(|l| l.id.as_str()).collect::<Vec<_>>(),
            vec![new.id.as_str(), lost.id.as_str(), old.id.as_str()]
        );

        let new_only = repo
            .list(&LeadQuery {
                status: Some(LeadStatus::New),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(new_only.len(), 3);
        assert!(!new_only.contains(&lost));
    }

    #[test]
    fn stats_group_by_status_and_source() {
        let (_temp, storage) = setup();
        let repo = LeadRepository::new(&storage);
        repo.create(&lead("u1", LeadStatus::New, 0)).unwrap();
        repo.create(&lead("u1", LeadStatus::New, 0)).unwrap();
        repo.create(&lead("u1", LeadStatus::Lost, 0)).unwrap();

        let stats = repo.stats(&LeadQuery::default()).unwrap();
        assert_eq!(stats.total_leads, 3);
        assert_eq!(
            stats.leads_by_status,
            vec![
                CountBucket {
                    id: "lost".into(),
                    count: 1
                },
                CountBucket {
                    id: "new".into(),
                    count: 2
                },
            ]
        );
        assert_eq!(stats.leads_by_source.len(), 1);
        assert_eq!(stats.leads_by_source[0].count, 3);
    }
}
