//! Order placement workflow.
//!
//! ## Steps
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. product exists                            else 404                  │
//! │  2. quantity > 0                              else 400                  │
//! │  3. quantity <= stock (early check)           else 400                  │
//! │  4. total = price × quantity (snapshot)                                 │
//! │  5. conditional decrement + insert, one tx    else 400 / 500            │
//! │  6. new_order event to the buyer's sockets    (best effort)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Step 3 only produces the friendly error early. Under concurrency the
//! conditional update in step 5 decides.

use tracing::info;

use knet_core::validation::validate_quantity;
use knet_core::{CoreError, Order, ValidationError};
use knet_db::{Database, NewOrder};

use crate::dto::OrderDto;
use crate::error::ApiResult;
use crate::hub::{NotificationHub, OrderEvent};
use crate::state::AppState;

/// Places orders and announces them.
#[derive(Clone)]
pub struct OrderService {
    db: Database,
    hub: NotificationHub,
}

impl OrderService {
    pub fn new(db: Database, hub: NotificationHub) -> Self {
        OrderService { db, hub }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.db.clone(), state.hub.clone())
    }

    /// Places an order for `user_id` and returns it as stored.
    pub async fn place_order(&self, user_id: i64, product_id: i64, quantity: i64) -> ApiResult<Order> {
        let product = self
            .db
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or(CoreError::ProductNotFound(product_id))?;

        validate_quantity(quantity)?;

        if !product.has_stock_for(quantity) {
            return Err(CoreError::InsufficientStock {
                product_id,
                available: product.stock,
                requested: quantity,
            }
            .into());
        }

        let total = product
            .price()
            .checked_multiply_quantity(quantity)
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "quantity".to_string(),
                reason: "order total is too large".to_string(),
            })?;

        let order = self
            .db
            .orders()
            .place(NewOrder {
                user_id,
                product_id,
                quantity,
                total_price_cents: total.cents(),
            })
            .await?;

        info!(
            order_id = order.id,
            user_id,
            product_id,
            quantity,
            total = %total,
            "Order placed"
        );

        // No receivers is fine: the event is best effort
        self.hub
            .notify(user_id, OrderEvent::new_order(OrderDto::from(order.clone())))
            .await;

        Ok(order)
    }

    /// Loads an order, 404 when it doesn't exist.
    pub async fn find(&self, order_id: i64) -> ApiResult<Order> {
        self.db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id).into())
    }
}
