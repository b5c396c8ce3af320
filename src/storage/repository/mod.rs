// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the document store.
//!
//! Identities have their own repository. Leads, tasks and tickets share the
//! generic `OwnedRepository`, each adding its own filters and statistics.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::ValidationError;

use super::{DocumentStorage, OwnedResource, StorageError, StoragePaths, StorageResult};

pub mod leads;
pub mod tasks;
pub mod tickets;
pub mod users;

pub use leads::{LeadQuery, LeadRepository, LeadSource, LeadStats, LeadStatus, LeadUpdate, StoredLead};
pub use tasks::{
    RelatedKind, RelatedTo, StoredTask, TaskPriority, TaskQuery, TaskRepository, TaskStats, TaskStatus,
    TaskUpdate,
};
pub use tickets::{
    StoredTicket, TicketCategory, TicketPriority, TicketQuery, TicketRepository, TicketStats,
    TicketStatus, TicketUpdate,
};
pub use users::{NewIdentity, StoredUser, UserRepository};

/// Default page size for listings.
pub const DEFAULT_PAGE_SIZE: usize = 10;
/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: usize = 100;

/// A record type stored one-file-per-document in its own collection.
pub trait Document: Serialize + DeserializeOwned + OwnedResource {
    fn id(&self) -> &str;
    fn collection_dir(paths: &StoragePaths) -> PathBuf;
    fn document_path(paths: &StoragePaths, id: &str) -> PathBuf;
}

/// A listing filter over one document type.
pub trait Filter<T> {
    fn matches(&self, doc: &T) -> bool;
}

/// Record IDs are UUIDs; anything else never names a document.
///
/// Rejecting other strings up front keeps path parameters such as
/// `..%2Fusers%2F<id>` from escaping the collection directory.
pub fn is_valid_id(id: &str) -> bool {
    uuid::Uuid::parse_str(id).is_ok()
}

/// Field validator for required text sent in a partial update.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// Deserialize a nullable field so that an absent key stays `None` while an
/// explicit `null` becomes `Some(None)`. Pair with `#[serde(default)]`.
pub fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// CRUD for an owned document collection.
pub struct OwnedRepository<'a, T> {
    storage: &'a DocumentStorage,
    _marker: PhantomData<T>,
}

impl<'a, T: Document> OwnedRepository<'a, T> {
    pub fn new(storage: &'a DocumentStorage) -> Self {
        Self {
            storage,
            _marker: PhantomData,
        }
    }

    fn path(&self, id: &str) -> StorageResult<PathBuf> {
        if !is_valid_id(id) {
            return Err(StorageError::NotFound(format!("{} {id}", T::kind())));
        }
        Ok(T::document_path(self.storage.paths(), id))
    }

    pub fn exists(&self, id: &str) -> bool {
        self.path(id).is_ok_and(|path| self.storage.exists(path))
    }

    pub fn get(&self, id: &str) -> StorageResult<T> {
        let path = self.path(id)?;
        self.storage.read_json(path)
    }

    pub fn create(&self, doc: &T) -> StorageResult<()> {
        let path = self.path(doc.id())?;
        if self.storage.exists(&path) {
            return Err(StorageError::Duplicate(format!("{} {}", T::kind(), doc.id())));
        }
        self.storage.write_json(path, doc)
    }

    /// Overwrite an existing document. Last write wins.
    pub fn update(&self, doc: &T) -> StorageResult<()> {
        let path = self.path(doc.id())?;
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("{} {}", T::kind(), doc.id())));
        }
        self.storage.write_json(path, doc)
    }

    pub fn delete(&self, id: &str) -> StorageResult<()> {
        let path = self.path(id)?;
        self.storage.delete(path)
    }

    /// Every document regardless of owner.
    pub fn list_all(&self) -> StorageResult<Vec<T>> {
        self.storage
            .read_all_json(T::collection_dir(self.storage.paths()))
    }

    /// Documents matching `filter`, in storage order.
    pub fn find<F: Filter<T>>(&self, filter: &F) -> StorageResult<Vec<T>> {
        let mut docs = self.list_all()?;
        docs.retain(|doc| filter.matches(doc));
        Ok(docs)
    }
}

/// One bucket of a grouped count, e.g. `{ "_id": "open", "count": 3 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CountBucket {
    #[serde(rename = "_id")]
    pub id: String,
    pub count: usize,
}

/// Group `items` by `key` and count each group, sorted by key.
pub fn count_by<T, K: Into<String>>(items: &[T], key: impl Fn(&T) -> K) -> Vec<CountBucket> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for item in items {
        *counts.entry(key(item).into()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(id, count)| CountBucket { id, count })
        .collect()
}

/// One page of a sorted listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.limit)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// Slice a sorted listing. `page` is 1-based; both values are clamped to
/// sane bounds (`page >= 1`, `1 <= limit <= MAX_PAGE_SIZE`).
pub fn paginate<T>(items: Vec<T>, page: Option<usize>, limit: Option<usize>) -> Page<T> {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let total = items.len();
    let skip = (page - 1).saturating_mul(limit);

    Page {
        items: items.into_iter().skip(skip).take(limit).collect(),
        page,
        limit,
        total,
    }
}
