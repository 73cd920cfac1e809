//! # knet-db: Database Layer for the Knet Shop
//!
//! This crate provides database access for the shop backend.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Knet Shop Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /api/v1/orders/create)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     knet-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ UserRepo      │    │ 001_initial  │  │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo   │    │ _schema.sql  │  │   │
//! │  │   │               │    │ OrderRepo     │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (KNET_DATABASE_PATH)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use knet_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("knet.db")).await?;
//! let products = db.products().list().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::order::{NewOrder, OrderRepository};
pub use repository::product::{NewProduct, ProductChanges, ProductRepository};
pub use repository::user::{NewUser, UserChanges, UserRepository};
