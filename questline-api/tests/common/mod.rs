//! Shared infrastructure for API integration tests: a router wired to the
//! in-memory store, plus helpers for issuing requests and bootstrapping
//! authenticated users.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use questline_api::app::{build_router, AppState};
use questline_shared::auth::token::TokenService;
use questline_shared::config::CoreConfig;
use questline_shared::service::{AuthService, ScoringService};
use questline_shared::store::MemoryStore;
use serde_json::{json, Value};
use tower::Service as _;
use uuid::Uuid;

pub struct TestContext {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub tokens: TokenService,
}

impl TestContext {
    pub fn new() -> Self {
        let config = CoreConfig::new("api-integration-test-secret-32b!!");
        let store = Arc::new(MemoryStore::new());
        let tokens = TokenService::new(config.jwt_secret.as_bytes(), config.access_token_ttl);

        let auth = AuthService::new(store.clone(), tokens.clone(), &config);
        let scoring = ScoringService::new(store.clone(), &config);
        let app = build_router(AppState::new(auth, scoring, tokens.clone()));

        Self { app, store, tokens }
    }

    /// Issues a request and returns status plus parsed JSON body (`Null`
    /// for empty bodies).
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

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        // Extractor rejections produce plain-text bodies; surface those as
        // strings so assertions on the status still read well.
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        (status, body)
    }

    pub async fn register(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.request(
            Method::POST,
            "/register",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Logs in and returns the `(access, refresh)` pair.
    pub async fn login(&self, email: &str, password: &str) -> (String, String) {
        let (status, body) = self
            .request(
                Method::POST,
                "/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");

        (
            body["access_token"].as_str().unwrap().to_string(),
            body["refresh_token"].as_str().unwrap().to_string(),
        )
    }

    /// Registers a fresh user and returns their id plus a valid access
    /// token.
    pub async fn register_and_login(&self, email: &str) -> (Uuid, String) {
        let (status, body) = self.register(email, "password1").await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");

        let (access, _) = self.login(email, "password1").await;
        let user_id = self.tokens.validate_access_token(&access).unwrap().sub;

        (user_id, access)
    }
}
