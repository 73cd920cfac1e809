//! # Order Repository
//!
//! Database operations for orders, including the atomic placement
//! transaction.
//!
//! ## Order Placement Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    place(new_order)                                     │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  UPDATE products SET stock = stock - q                                  │
//! │   WHERE id = ? AND stock >= q          ← the only stock guard that     │
//! │    │                                      counts under concurrency     │
//! │    ├── 0 rows ──► ROLLBACK ──► DbError::InsufficientStock              │
//! │    │                                                                    │
//! │    ▼ 1 row                                                              │
//! │  INSERT INTO orders (..., status = 'pending')                           │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  COMMIT ──► Order                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any error before the commit drops the transaction, which rolls it back.
//! Deleting an order never gives stock back.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use knet_core::{Order, OrderStatus};

/// Fields required to place an order.
///
/// `total_price_cents` is computed by the caller from the product price it
/// read, so the stored total is a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct NewOrder {
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub total_price_cents: i64,
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Decrements stock and inserts a pending order in one transaction.
    ///
    /// ## Returns
    /// * `Ok(Order)` - Committed order
    /// * `Err(DbError::InsufficientStock)` - Stock no longer covers the
    ///   quantity; nothing was written
    /// * `Err(DbError::NotFound)` - The product is gone; nothing was written
    pub async fn place(&self, order: NewOrder) -> DbResult<Order> {
        debug!(
            user_id = order.user_id,
            product_id = order.product_id,
            quantity = order.quantity,
            "Placing order"
        );

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let decremented = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - ?1, updated_at = ?2
            WHERE id = ?3 AND stock >= ?1
            "#,
        )
        .bind(order.quantity)
        .bind(now)
        .bind(order.product_id)
        .execute(&mut *tx)
        .await?;

        if decremented.rows_affected() == 0 {
            let exists: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = ?1)")
                .bind(order.product_id)
                .fetch_one(&mut *tx)
                .await?;
            tx.rollback().await?;
            debug!(
                product_id = order.product_id,
                exists = exists != 0,
                "Conditional stock decrement matched no row"
            );

            if exists == 0 {
                return Err(DbError::not_found("Product", order.product_id));
            }
            return Err(DbError::InsufficientStock {
                product_id: order.product_id,
                requested: order.quantity,
            });
        }

        let placed = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders
                (user_id, product_id, quantity, total_price_cents, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING id, user_id, product_id, quantity, total_price_cents, status, created_at, updated_at
            "#,
        )
        .bind(order.user_id)
        .bind(order.product_id)
        .bind(order.quantity)
        .bind(order.total_price_cents)
        .bind(OrderStatus::Pending)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            order_id = placed.id,
            product_id = placed.product_id,
            quantity = placed.quantity,
            "Order placed"
        );
        Ok(placed)
    }

    /// Gets an order by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, product_id, quantity, total_price_cents, status, created_at, updated_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Lists every order, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, product_id, quantity, total_price_cents, status, created_at, updated_at
            FROM orders
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists the orders of one user, oldest first.
    pub async fn list_for_user(&self, user_id: i64) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, product_id, quantity, total_price_cents, status, created_at, updated_at
            FROM orders
            WHERE user_id = ?1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Sets the status of an order. Any status may follow any other.
    pub async fn update_status(&self, id: i64, status: OrderStatus) -> DbResult<Order> {
        debug!(id, status = %status, "Updating order status");

        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders SET status = ?2, updated_at = ?3
            WHERE id = ?1
            RETURNING id, user_id, product_id, quantity, total_price_cents, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        order.ok_or_else(|| DbError::not_found("Order", id))
    }

    /// Deletes an order. Stock is not restored.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting order");

        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }

    /// Counts orders (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
