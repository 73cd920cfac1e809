//! HTTP routing.
//!
//! ## Route Map
//! ```text
//! ┌──────────────────────────────┬──────────────────────────────────────────┐
//! │ GET  /                       │ welcome text                             │
//! │ GET  /health                 │ liveness + database check                │
//! │ GET  /ws?token=...           │ order notifications (websocket)          │
//! │ /api/v1/users/...            │ register, login, current_user, edit, ... │
//! │ /api/v1/products/...         │ catalog (writes: admin only)             │
//! │ /api/v1/orders/...           │ placement, status, owner/admin access    │
//! │ POST /api/v1/refresh-token   │ refresh token → access token             │
//! └──────────────────────────────┴──────────────────────────────────────────┘
//! ```

pub mod orders;
pub mod products;
pub mod refresh;
pub mod users;

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::ApiConfig;
use crate::hub::ws_handler;
use crate::state::AppState;

/// Builds the full application router.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/users", users::router())
        .nest("/products", products::router())
        .nest("/orders", orders::router())
        .route("/refresh-token", post(refresh::refresh_token));

    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .route("/ws", get(ws_handler))
        .nest("/api/v1", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    match config.cors_allowed_origin.as_deref() {
        None => CorsLayer::permissive(),
        Some(origin) => match HeaderValue::from_str(origin) {
            Ok(origin) => CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(Any)
                .allow_headers(Any),
            Err(_) => {
                warn!(%origin, "Invalid CORS origin, cross-origin requests disabled");
                CorsLayer::new()
            }
        },
    }
}

async fn welcome() -> &'static str {
    "Welcome to the Knet shop API"
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if state.db.health_check().await {
        (StatusCode::OK, Json(json!({ "status": "ok", "database": true })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "database": false })),
        )
    }
}
