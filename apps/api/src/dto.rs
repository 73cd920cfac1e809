//! Response shapes.
//!
//! Domain types keep money in cents and images as bytes; clients see
//! decimal prices and base64 images.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Serialize;

use knet_core::{Order, OrderStatus, Product};

/// Product as returned by the catalog routes.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDto {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
    /// Base64 of the stored image bytes.
    pub image: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        ProductDto {
            id: product.id,
            price: product.price().to_decimal(),
            image: BASE64.encode(&product.image),
            name: product.name,
            description: product.description,
            stock: product.stock,
            user_id: product.user_id,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Order as returned by the order routes and pushed over the websocket.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDto {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub total_price: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderDto {
    fn from(order: Order) -> Self {
        OrderDto {
            id: order.id,
            user_id: order.user_id,
            product_id: order.product_id,
            quantity: order.quantity,
            total_price: order.total_price().to_decimal(),
            status: order.status,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Decodes a base64 image field from a request body.
pub fn decode_image(encoded: &str) -> Result<Vec<u8>, knet_core::ValidationError> {
    // Tolerate data URLs ("data:image/png;base64,....")
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => encoded,
    };

    BASE64
        .decode(payload.trim())
        .map_err(|e| knet_core::ValidationError::InvalidFormat {
            field: "image".to_string(),
            reason: e.to_string(),
        })
}
