//! # Repository Module
//!
//! One repository per table, each owning a clone of the pool.
//!
//! ```text
//! HTTP handler
//!      │  db.orders().place(new_order)
//!      ▼
//! OrderRepository ──► SQL ──► SQLite
//! ```
//!
//! - [`UserRepository`](user::UserRepository) - accounts and credentials lookup
//! - [`ProductRepository`](product::ProductRepository) - catalog CRUD and images
//! - [`OrderRepository`](order::OrderRepository) - order placement and status

pub mod order;
pub mod product;
pub mod user;
