// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! CRM Server - Leads, Tasks and Support Tickets
//!
//! REST backend for a small multi-tenant CRM. Identities register and log in
//! for a bearer token; every other route is token-gated, and records are
//! visible only to their creator unless the caller is an admin.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum) and OpenAPI document
//! - `auth` - Bearer tokens, password hashing, access control gate
//! - `storage` - JSON document store, repositories, ownership rules, audit log
//! - `telemetry` - tracing subscriber setup

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
pub mod telemetry;
