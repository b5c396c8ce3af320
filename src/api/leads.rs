// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Lead endpoints.
//!
//! Non-admin callers only ever see leads they created. A lead owned by
//! someone else answers exactly like a lead that does not exist.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use super::{storage_failure, ApiJson, References};
use crate::{
    audit_log,
    auth::Auth,
    error::ApiError,
    models::{CreateLeadRequest, LeadListResponse, LeadResponse, MessageResponse},
    state::AppState,
    storage::{
        repository::{paginate, LeadSource, LeadStatus},
        AuditEventType, LeadQuery, LeadRepository, LeadStats, LeadUpdate, OwnershipCheck,
        OwnershipFilter, StoredLead,
    },
};

/// Query parameters for listing leads.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListLeadsParams {
    pub status: Option<LeadStatus>,
    pub source: Option<LeadSource>,
    /// 1-based page number (default 1).
    pub page: Option<usize>,
    /// Page size (default 10, max 100).
    pub limit: Option<usize>,
}

#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "Leads",
    security(("bearer" = [])),
    params(ListLeadsParams),
    responses(
        (status = 200, description = "Leads visible to the caller, newest first", body = LeadListResponse),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn list_leads(
    Auth(user): Auth,
    State(state): State<AppState>,
    Query(params): Query<ListLeadsParams>,
) -> Result<Json<LeadListResponse>, ApiError> {
    let query = OwnershipFilter::scope_query(
        &user,
        LeadQuery {
            status: params.status,
            source: params.source,
            created_by: None,
        },
    );

    let storage = state.storage();
    let leads = LeadRepository::new(&storage)
        .list(&query)
        .map_err(|e| state.server_error("Failed to list leads", e))?;

    let page = paginate(leads, params.page, params.limit);
    let pagination = (&page).into();
    let leads = References::new(&user, &storage)
        .lead_views(page.items)
        .map_err(|e| state.server_error("Failed to resolve lead references", e))?;
    Ok(Json(LeadListResponse { leads, pagination }))
}

#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    security(("bearer" = [])),
    request_body = CreateLeadRequest,
    responses(
        (status = 201, description = "Lead created", body = LeadResponse),
        (status = 400, description = "Missing required fields"),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn create_lead(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateLeadRequest>,
) -> Result<(StatusCode, Json<LeadResponse>), ApiError> {
    let lead = request.into_lead(&user.user_id)?;

    let storage = state.storage();
    LeadRepository::new(&storage)
        .create(&lead)
        .map_err(|e| state.server_error("Failed to create lead", e))?;

    tracing::info!(lead_id = %lead.id, user_id = %user.user_id, "Lead created");
    audit_log!(&storage, AuditEventType::LeadCreated, user, "lead", &lead.id);

    let lead = References::new(&user, &storage)
        .lead_view(lead)
        .map_err(|e| state.server_error("Failed to resolve lead references", e))?;
    Ok((
        StatusCode::CREATED,
        Json(LeadResponse {
            message: Some("Lead created successfully".to_string()),
            lead,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/leads/stats",
    tag = "Leads",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Counts over the leads visible to the caller", body = LeadStats),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn lead_stats(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<LeadStats>, ApiError> {
    let query = OwnershipFilter::scope_query(&user, LeadQuery::default());
    let storage = state.storage();
    let stats = LeadRepository::new(&storage)
        .stats(&query)
        .map_err(|e| state.server_error("Failed to compute lead stats", e))?;
    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/api/leads/{lead_id}",
    tag = "Leads",
    security(("bearer" = [])),
    params(("lead_id" = String, Path, description = "Lead ID")),
    responses(
        (status = 200, description = "Lead", body = LeadResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Lead not found"),
    )
)]
pub async fn get_lead(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(lead_id): Path<String>,
) -> Result<Json<LeadResponse>, ApiError> {
    let storage = state.storage();
    let lead = LeadRepository::new(&storage)
        .get(&lead_id)
        .visible_to(&user)
        .map_err(|e| storage_failure::<StoredLead>(&state, "Failed to load lead", e))?;

    let lead = References::new(&user, &storage)
        .lead_view(lead)
        .map_err(|e| state.server_error("Failed to resolve lead references", e))?;
    Ok(Json(LeadResponse { message: None, lead }))
}

#[utoipa::path(
    put,
    path = "/api/leads/{lead_id}",
    tag = "Leads",
    security(("bearer" = [])),
    params(("lead_id" = String, Path, description = "Lead ID")),
    request_body = LeadUpdate,
    responses(
        (status = 200, description = "Lead updated", body = LeadResponse),
        (status = 400, description = "Required field set to blank"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Lead not found"),
    )
)]
pub async fn update_lead(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(lead_id): Path<String>,
    ApiJson(update): ApiJson<LeadUpdate>,
) -> Result<Json<LeadResponse>, ApiError> {
    update.validate()?;
    let storage = state.storage();
    let repo = LeadRepository::new(&storage);
    let mut lead = repo
        .get(&lead_id)
        .visible_to(&user)
        .map_err(|e| storage_failure::<StoredLead>(&state, "Failed to load lead", e))?;

    lead.apply(update);
    repo.update(&lead)
        .map_err(|e| storage_failure::<StoredLead>(&state, "Failed to update lead", e))?;

    audit_log!(&storage, AuditEventType::LeadUpdated, user, "lead", &lead.id);

    let lead = References::new(&user, &storage)
        .lead_view(lead)
        .map_err(|e| state.server_error("Failed to resolve lead references", e))?;
    Ok(Json(LeadResponse {
        message: Some("Lead updated successfully".to_string()),
        lead,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/leads/{lead_id}",
    tag = "Leads",
    security(("bearer" = [])),
    params(("lead_id" = String, Path, description = "Lead ID")),
    responses(
        (status = 200, description = "Lead deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Lead not found"),
    )
)]
pub async fn delete_lead(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(lead_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let storage = state.storage();
    let repo = LeadRepository::new(&storage);
    let lead = repo
        .get(&lead_id)
        .visible_to(&user)
        .map_err(|e| storage_failure::<StoredLead>(&state, "Failed to load lead", e))?;

    repo.delete(&lead.id)
        .map_err(|e| storage_failure::<StoredLead>(&state, "Failed to delete lead", e))?;

    tracing::info!(lead_id = %lead.id, user_id = %user.user_id, "Lead deleted");
    audit_log!(&storage, AuditEventType::LeadDeleted, user, "lead", &lead.id);

    Ok(Json(MessageResponse::new("Lead deleted successfully")))
}
