//! # knet-core: Pure Business Logic for the Knet Shop
//!
//! This crate holds the domain model of the shop backend as plain types and
//! pure functions. Nothing in here touches a database, a socket or a file.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Knet Shop Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP clients / storefront                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP, websocket              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    knet-api (axum)                              │   │
//! │  │    /users, /products, /orders, /refresh-token, /ws              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ knet-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │   types   │  │   money   │  │ validation│                  │   │
//! │  │   │   User    │  │   Money   │  │   rules   │                  │   │
//! │  │   │  Product  │  │  (cents)  │  │  checks   │                  │   │
//! │  │   │   Order   │  │           │  │           │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    knet-db (Database Layer)                     │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Product, Order, Role, OrderStatus)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Field validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use knet_core::money::Money;
//!
//! // Prices arrive as decimals at the HTTP edge and are held as cents.
//! let price = Money::from_decimal(19.99).unwrap();
//! assert_eq!(price.cents(), 1999);
//!
//! // An order total is fixed at creation time.
//! let total = price.multiply_quantity(3);
//! assert_eq!(total.cents(), 5997);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minimum length of an account password.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum length of names (user names, product names).
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length of an email address (RFC 5321 path limit).
pub const MAX_EMAIL_LENGTH: usize = 254;
