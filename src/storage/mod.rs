// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Document Storage Module
//!
//! Persistent storage as plain JSON documents on the local filesystem, one
//! file per record, rooted at `DATA_DIR`.
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/
//!   users/{user_id}.json      # Identity records (bcrypt hash, role)
//!   leads/{lead_id}.json
//!   tasks/{task_id}.json
//!   tickets/{ticket_id}.json
//!   audit/
//!     {date}/events.jsonl     # Daily audit logs
//! ```
//!
//! ## Consistency
//!
//! - Single-document writes are atomic (temp file + rename)
//! - Concurrent writers of the same document: last write wins
//! - Registration is the only multi-step operation and runs under a lock

pub mod audit;
pub mod documents;
pub mod ownership;
pub mod paths;
pub mod repository;

pub use audit::{AuditEvent, AuditEventType, AuditRepository};
pub use documents::{DocumentStorage, StorageError, StorageResult};
pub use ownership::{OwnedResource, OwnershipCheck, OwnershipFilter, RestrictedFields, ScopedQuery};
pub use paths::StoragePaths;
pub use repository::{
    LeadQuery, LeadRepository, LeadStats, LeadUpdate, NewIdentity, StoredLead, StoredTask,
    StoredTicket, StoredUser, TaskQuery, TaskRepository, TaskStats, TaskUpdate, TicketQuery,
    TicketRepository, TicketStats, TicketUpdate, UserRepository,
};
