//! Shared helpers for the HTTP tests.

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};
use tower::ServiceExt;

use knet_api::{build_router, ApiConfig, AppState};
use knet_core::Role;
use knet_db::{Database, UserChanges};

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub struct LoggedIn {
    pub user_id: i64,
    pub access_token: String,
    pub refresh_token: String,
}

impl TestApp {
    pub async fn new() -> Self {
        let config = ApiConfig::for_tests();
        let db = Database::new(config.db_config()).await.unwrap();
        let state = AppState::new(db, config);
        TestApp {
            router: build_router(state.clone()),
            state,
        }
    }

    pub async fn raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, bytes) = self.raw(method, uri, token, body).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    /// Public registration with the given role.
    pub async fn try_register(&self, email: &str, role: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.call(
            Method::POST,
            "/api/v1/users/register",
            token,
            Some(json!({
                "name": "Test User",
                "email": email,
                "password": "secret1",
                "address": "1 Test Lane",
                "phone_number": "555-0100",
                "role": role,
            })),
        )
        .await
    }

    /// Registers an account. Admins sign up as customers and are promoted
    /// in the store, the way `ensure_admin` seeds the first one.
    pub async fn register(&self, email: &str, role: &str) -> Value {
        let public_role = if role == "admin" { "customer" } else { role };
        let (status, mut body) = self.try_register(email, public_role, None).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        if role == "admin" {
            let id = body["user"]["id"].as_i64().unwrap();
            let user = self
                .state
                .db
                .users()
                .update(
                    id,
                    UserChanges {
                        role: Some(Role::Admin),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
            body["user"]["role"] = json!(user.role);
        }
        body
    }

    pub async fn login(&self, email: &str) -> LoggedIn {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/v1/users/login",
                None,
                Some(json!({ "email": email, "password": "secret1" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        LoggedIn {
            user_id: body["user_id"].as_i64().unwrap(),
            access_token: body["access_token"].as_str().unwrap().to_string(),
            refresh_token: body["refresh_token"].as_str().unwrap().to_string(),
        }
    }

    pub async fn signup(&self, email: &str, role: &str) -> LoggedIn {
        self.register(email, role).await;
        self.login(email).await
    }

    /// Creates a product as `admin` and returns its id.
    pub async fn add_product(&self, admin: &LoggedIn, price: f64, stock: i64) -> i64 {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/v1/products/add",
                Some(&admin.access_token),
                Some(json!({
                    "name": "Desk Lamp",
                    "description": "Warm light",
                    "price": price,
                    "stock": stock,
                    "image": BASE64.encode(b"\x89PNG fake"),
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "add product failed: {}", body);
        body["product"]["id"].as_i64().unwrap()
    }

    pub async fn product_stock(&self, product_id: i64) -> i64 {
        self.state
            .db
            .products()
            .get_by_id(product_id)
            .await
            .unwrap()
            .unwrap()
            .stock
    }
}
