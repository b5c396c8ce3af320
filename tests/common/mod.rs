// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use crm_server::{
    api::router,
    auth::{PasswordVerifier, Role, TokenService},
    config::{AppEnvironment, AuthConfig},
    state::AppState,
    storage::{DocumentStorage, StoragePaths},
};

const JWT_SECRET: &str = "integration-secret";
const TOKEN_TTL_HOURS: i64 = 24;

fn token_service() -> TokenService {
    TokenService::new(&AuthConfig {
        jwt_secret: JWT_SECRET.to_string(),
        token_ttl: chrono::Duration::hours(TOKEN_TTL_HOURS),
    })
}

pub struct TestApp {
    app: Router,
    _data: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let data = TempDir::new().unwrap();
        let mut storage = DocumentStorage::new(StoragePaths::new(data.path()));
        storage.initialize().unwrap();

        let tokens = token_service();
        let state = AppState::new(
            storage,
            tokens,
            PasswordVerifier::new(4).unwrap(),
            AppEnvironment::Development,
        );

        Self {
            app: router(state),
            _data: data,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    /// Send `body` verbatim with the given content type.
    pub async fn request_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        content_type: &str,
        body: &str,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Register and return `(token, user)`.
    pub async fn register(&self, username: &str) -> (String, Value) {
        let (status, body) = self
            .post(
                "/api/auth/register",
                None,
                json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": "secret1",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register {username}: {body}");
        (body["token"].as_str().unwrap().to_string(), body["user"].clone())
    }

    /// A token signed with the server's secret but minted at `issued_at`.
    pub fn token_issued_at(&self, user: &Value, issued_at: chrono::DateTime<chrono::Utc>) -> String {
        let role = match user["role"].as_str() {
            Some("admin") => Role::Admin,
            _ => Role::User,
        };
        token_service()
            .issue_at(
                user["id"].as_str().unwrap(),
                user["username"].as_str().unwrap(),
                role,
                issued_at,
            )
            .unwrap()
    }

    pub async fn create_lead(&self, token: &str, name: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/leads",
                Some(token),
                json!({
                    "name": name,
                    "email": format!("{name}@lead.example.com"),
                    "phone": "555-0100",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create lead: {body}");
        body["lead"].clone()
    }
}
