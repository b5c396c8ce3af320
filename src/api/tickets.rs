// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Support ticket endpoints.
//!
//! Owners may edit their own tickets, but `status` and `assignedTo` only
//! change when an admin sends them. An admin sending `"assignedTo": null`
//! unassigns the ticket. Deletion and store-wide statistics are admin only.

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
    auth::{AdminOnly, Auth},
    error::ApiError,
    models::{CreateTicketRequest, MessageResponse, TicketListResponse, TicketResponse},
    state::AppState,
    storage::{
        repository::{paginate, TicketCategory, TicketPriority, TicketStatus},
        AuditEventType, OwnershipCheck, OwnershipFilter, StoredTicket, TicketQuery,
        TicketRepository, TicketStats, TicketUpdate,
    },
};

/// Query parameters for listing tickets.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListTicketsParams {
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub category: Option<TicketCategory>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[utoipa::path(
    get,
    path = "/api/tickets",
    tag = "Tickets",
    security(("bearer" = [])),
    params(ListTicketsParams),
    responses(
        (status = 200, description = "Tickets visible to the caller, newest first", body = TicketListResponse),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn list_tickets(
    Auth(user): Auth,
    State(state): State<AppState>,
    Query(params): Query<ListTicketsParams>,
) -> Result<Json<TicketListResponse>, ApiError> {
    let query = OwnershipFilter::scope_query(
        &user,
        TicketQuery {
            status: params.status,
            priority: params.priority,
            category: params.category,
            created_by: None,
        },
    );

    let storage = state.storage();
    let tickets = TicketRepository::new(&storage)
        .list(&query)
        .map_err(|e| state.server_error("Failed to list tickets", e))?;

    let page = paginate(tickets, params.page, params.limit);
    let pagination = (&page).into();
    let tickets = References::new(&user, &storage)
        .ticket_views(page.items)
        .map_err(|e| state.server_error("Failed to resolve ticket references", e))?;
    Ok(Json(TicketListResponse { tickets, pagination }))
}

#[utoipa::path(
    post,
    path = "/api/tickets",
    tag = "Tickets",
    security(("bearer" = [])),
    request_body = CreateTicketRequest,
    responses(
        (status = 201, description = "Ticket created", body = TicketResponse),
        (status = 400, description = "Missing title, description or category"),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn create_ticket(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateTicketRequest>,
) -> Result<(StatusCode, Json<TicketResponse>), ApiError> {
    let ticket = request.into_ticket(&user.user_id)?;

    let storage = state.storage();
    TicketRepository::new(&storage)
        .create(&ticket)
        .map_err(|e| state.server_error("Failed to create ticket", e))?;

    tracing::info!(ticket_id = %ticket.id, user_id = %user.user_id, "Ticket created");
    audit_log!(&storage, AuditEventType::TicketCreated, user, "ticket", &ticket.id);

    let ticket = References::new(&user, &storage)
        .ticket_view(ticket)
        .map_err(|e| state.server_error("Failed to resolve ticket references", e))?;
    Ok((
        StatusCode::CREATED,
        Json(TicketResponse {
            message: Some("Ticket created successfully".to_string()),
            ticket,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/tickets/stats",
    tag = "Tickets",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Store-wide ticket statistics", body = TicketStats),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
    )
)]
pub async fn ticket_stats(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<TicketStats>, ApiError> {
    let storage = state.storage();
    let stats = TicketRepository::new(&storage)
        .stats()
        .map_err(|e| state.server_error("Failed to compute ticket stats", e))?;
    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/api/tickets/{ticket_id}",
    tag = "Tickets",
    security(("bearer" = [])),
    params(("ticket_id" = String, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket", body = TicketResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Ticket not found"),
    )
)]
pub async fn get_ticket(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
) -> Result<Json<TicketResponse>, ApiError> {
    let storage = state.storage();
    let ticket = TicketRepository::new(&storage)
        .get(&ticket_id)
        .visible_to(&user)
        .map_err(|e| storage_failure::<StoredTicket>(&state, "Failed to load ticket", e))?;

    let ticket = References::new(&user, &storage)
        .ticket_view(ticket)
        .map_err(|e| state.server_error("Failed to resolve ticket references", e))?;
    Ok(Json(TicketResponse { message: None, ticket }))
}

#[utoipa::path(
    put,
    path = "/api/tickets/{ticket_id}",
    tag = "Tickets",
    security(("bearer" = [])),
    params(("ticket_id" = String, Path, description = "Ticket ID")),
    request_body = TicketUpdate,
    responses(
        (status = 200, description = "Ticket updated", body = TicketResponse),
        (status = 400, description = "Title or description set to blank"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Ticket not found"),
    )
)]
pub async fn update_ticket(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
    ApiJson(mut update): ApiJson<TicketUpdate>,
) -> Result<Json<TicketResponse>, ApiError> {
    update.validate()?;
    let storage = state.storage();
    let repo = TicketRepository::new(&storage);
    let mut ticket = repo
        .get(&ticket_id)
        .visible_to(&user)
        .map_err(|e| storage_failure::<StoredTicket>(&state, "Failed to load ticket", e))?;

    OwnershipFilter::strip_restricted_fields(&user, &mut update);
    ticket.apply(update);
    repo.update(&ticket)
        .map_err(|e| storage_failure::<StoredTicket>(&state, "Failed to update ticket", e))?;

    audit_log!(&storage, AuditEventType::TicketUpdated, user, "ticket", &ticket.id);

    let ticket = References::new(&user, &storage)
        .ticket_view(ticket)
        .map_err(|e| state.server_error("Failed to resolve ticket references", e))?;
    Ok(Json(TicketResponse {
        message: Some("Ticket updated successfully".to_string()),
        ticket,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/tickets/{ticket_id}",
    tag = "Tickets",
    security(("bearer" = [])),
    params(("ticket_id" = String, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Ticket not found"),
    )
)]
pub async fn delete_ticket(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let storage = state.storage();
    TicketRepository::new(&storage)
        .delete(&ticket_id)
        .map_err(|e| storage_failure::<StoredTicket>(&state, "Failed to delete ticket", e))?;

    tracing::info!(ticket_id = %ticket_id, admin_id = %admin.user_id, "Ticket deleted");
    audit_log!(&storage, AuditEventType::TicketDeleted, admin, "ticket", &ticket_id);

    Ok(Json(MessageResponse::new("Ticket deleted successfully")))
}
