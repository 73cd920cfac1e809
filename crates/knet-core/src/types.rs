//! # Domain Types
//!
//! Core domain types used throughout the shop backend.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │     Product     │   │      Order      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (rowid)     │◄──│  user_id (FK)   │◄──│  product_id(FK) │       │
//! │  │  email (unique) │   │  price_cents    │   │  user_id (FK)   │       │
//! │  │  password_hash  │   │  stock          │   │  quantity       │       │
//! │  │  role           │   │  image (blob)   │   │  total_cents    │       │
//! │  └─────────────────┘   └─────────────────┘   │  status         │       │
//! │                                               └─────────────────┘       │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │      Role       │   │   OrderStatus   │                              │
//! │  │  Customer       │   │  Pending        │                              │
//! │  │  Admin          │   │  Shipped        │                              │
//! │  └─────────────────┘   │  Delivered      │                              │
//! │                        │  Canceled       │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ids are SQLite rowids. Deleting a user removes their products and orders,
//! deleting a product removes its orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Role
// =============================================================================

/// Authorization tier of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular shopper. Default for new registrations.
    Customer,
    /// May manage products and other users.
    Admin,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 2] = [Role::Customer, Role::Admin];

    /// Wire/storage name of the role.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Customer
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: Role::ALL.iter().map(|r| r.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle label of an order.
///
/// There is no transition graph: any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Shipped,
    Delivered,
    Canceled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Canceled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Canceled => "canceled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: OrderStatus::ALL
                    .iter()
                    .map(|s| s.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered account.
///
/// `password_hash` is never serialized, so a `User` can be placed in a
/// response body as is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub name: String,
    /// Unique across all accounts.
    pub email: String,
    /// Argon2 PHC string.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub address: String,
    pub phone_number: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins may act on any record; everybody else only on their own.
    #[inline]
    pub fn may_act_on(&self, owner_id: i64) -> bool {
        self.is_admin() || self.id == owner_id
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Free-form description (empty when not provided).
    pub description: String,

    /// Price in cents, always strictly positive.
    pub price_cents: i64,

    /// Units available for ordering, never negative.
    pub stock: i64,

    /// Raw image bytes. Served separately, so kept out of serialized forms
    /// and left empty by queries that do not select the column.
    #[serde(skip)]
    #[ts(skip)]
    #[cfg_attr(feature = "sqlx", sqlx(default))]
    pub image: Vec<u8>,

    /// Account that created the product.
    pub user_id: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether `quantity` units can be taken from current stock.
    #[inline]
    pub fn has_stock_for(&self, quantity: i64) -> bool {
        quantity <= self.stock
    }
}

// =============================================================================
// Order
// =============================================================================

/// An order of a single product by a single user.
///
/// `total_price_cents` is the product price times quantity at creation time
/// and is never recomputed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub total_price_cents: i64,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
