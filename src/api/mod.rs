// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{require_auth, Role},
    error::ApiError,
    models::{
        AuthResponse, CreateLeadRequest, CreateTaskRequest, CreateTicketRequest, LeadListResponse,
        LeadResponse, LeadSummary, LeadView, LoginRequest, MessageResponse, Pagination,
        RegisterRequest, RelatedView, TaskListResponse, TaskResponse, TaskView, TicketListResponse,
        TicketResponse, TicketView, UserListResponse, UserResponse, UserStats, UserSummary,
    },
    state::AppState,
    storage::{
        repository::{
            CountBucket, LeadSource, LeadStatus, RelatedKind, RelatedTo, TaskPriority, TaskStatus,
            TicketCategory, TicketPriority, TicketStatus,
        },
        LeadStats, LeadUpdate, OwnedResource, StorageError, StoredLead, StoredTask, StoredTicket,
        TaskStats, TaskUpdate, TicketStats, TicketUpdate,
    },
};

pub mod auth;
pub mod extract;
pub mod health;
pub mod leads;
pub mod references;
pub mod tasks;
pub mod tickets;
pub mod users;

pub use extract::ApiJson;
pub use references::References;

/// Map a storage failure on an owned record to a response.
///
/// `NotFound` (including "owned by someone else") becomes a 404 naming the
/// record kind; anything else is an internal error.
pub(crate) fn storage_failure<R: OwnedResource>(state: &AppState, context: &str, error: StorageError) -> ApiError {
    match error {
        StorageError::NotFound(_) => ApiError::not_found(format!("{} not found", R::kind())),
        other => state.server_error(context, other),
    }
}

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/me", get(users::me))
        .route("/users/stats", get(users::user_stats))
        .route("/leads", get(leads::list_leads).post(leads::create_lead))
        .route("/leads/stats", get(leads::lead_stats))
        .route(
            "/leads/{lead_id}",
            get(leads::get_lead)
                .put(leads::update_lead)
                .delete(leads::delete_lead),
        )
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route("/tasks/stats", get(tasks::task_stats))
        .route(
            "/tasks/{task_id}",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/tickets", get(tickets::list_tickets).post(tickets::create_ticket))
        .route("/tickets/stats", get(tickets::ticket_stats))
        .route(
            "/tickets/{ticket_id}",
            get(tickets::get_ticket)
                .put(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .merge(health_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::login,
        users::me,
        users::list_users,
        users::user_stats,
        leads::list_leads,
        leads::create_lead,
        leads::get_lead,
        leads::update_lead,
        leads::delete_lead,
        leads::lead_stats,
        tasks::list_tasks,
        tasks::create_task,
        tasks::get_task,
        tasks::update_task,
        tasks::delete_task,
        tasks::task_stats,
        tickets::list_tickets,
        tickets::create_ticket,
        tickets::get_ticket,
        tickets::update_ticket,
        tickets::delete_ticket,
        tickets::ticket_stats,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            Role,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            UserResponse,
            UserListResponse,
            UserStats,
            UserSummary,
            MessageResponse,
            Pagination,
            CountBucket,
            StoredLead,
            LeadSource,
            LeadStatus,
            CreateLeadRequest,
            LeadUpdate,
            LeadSummary,
            LeadView,
            LeadResponse,
            LeadListResponse,
            LeadStats,
            StoredTask,
            TaskPriority,
            TaskStatus,
            RelatedKind,
            RelatedTo,
            CreateTaskRequest,
            TaskUpdate,
            RelatedView,
            TaskView,
            TaskResponse,
            TaskListResponse,
            TaskStats,
            StoredTicket,
            TicketStatus,
            TicketPriority,
            TicketCategory,
            CreateTicketRequest,
            TicketUpdate,
            TicketView,
            TicketResponse,
            TicketListResponse,
            TicketStats,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Users", description = "Identity profiles and admin user management"),
        (name = "Leads", description = "Sales leads"),
        (name = "Tasks", description = "Follow-up tasks"),
        (name = "Tickets", description = "Support tickets"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::auth::{AuthenticatedUser, PasswordVerifier, Role, TokenService};
    use crate::config::{AppEnvironment, AuthConfig};
    use crate::state::AppState;
    use crate::storage::{DocumentStorage, NewIdentity, StoragePaths, UserRepository};
    use tempfile::TempDir;

    pub fn test_state() -> (TempDir, AppState) {
        let temp = TempDir::new().unwrap();
        let mut storage = DocumentStorage::new(StoragePaths::new(temp.path()));
        storage.initialize().unwrap();
        let tokens = TokenService::new(&AuthConfig {
            jwt_secret: "handler-tests".into(),
            token_ttl: chrono::Duration::hours(24),
        });
        let state = AppState::new(
            storage,
            tokens,
            PasswordVerifier::new(4).unwrap(),
            AppEnvironment::Development,
        );
        (temp, state)
    }

    /// Store an identity named `username` and return it as a caller.
    pub fn seed_user(state: &AppState, username: &str, role: Role) -> AuthenticatedUser {
        let user = UserRepository::new(&state.storage())
            .create_identity(
                NewIdentity {
                    username: username.to_string(),
                    email: format!("{username}@example.com"),
                    password_hash: "$2b$04$unused".into(),
                    company_name: Some(format!("{username} inc")),
                    phone: None,
                },
                role,
            )
            .unwrap();
        AuthenticatedUser {
            user_id: user.id,
            username: user.username,
            role,
        }
    }

    pub fn caller(user_id: &str, role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: user_id.to_string(),
            username: user_id.to_string(),
            role,
        }
    }
}
