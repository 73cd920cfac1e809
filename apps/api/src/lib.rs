//! # Knet API
//!
//! JSON HTTP server for the shop: accounts, catalog and orders.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Knet API Server                                  │
//! │                                                                         │
//! │  client ──► axum router ──► extractors (JWT) ──► handlers              │
//! │                                                     │                   │
//! │                                                     ▼                   │
//! │                                    services ──► knet-db ──► SQLite      │
//! │                                        │                                │
//! │                                        ▼                                │
//! │                           notification hub ──► /ws sockets             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The binary in `main.rs` only wires configuration, logging and the
//! listener; everything else is here so tests can drive the router directly.

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod hub;
pub mod password;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::build_router;
pub use state::AppState;
