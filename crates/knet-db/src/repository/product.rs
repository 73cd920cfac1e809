//! # Product Repository
//!
//! Database operations for the catalog.
//!
//! ## Image Storage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products                                                               │
//! │  ┌────┬────────────┬─────────────┬───────┬──────────────────────────┐   │
//! │  │ id │ name       │ price_cents │ stock │ image (BLOB, can be big) │   │
//! │  └────┴────────────┴─────────────┴───────┴──────────────────────────┘   │
//! │                                                                         │
//! │  get_by_id / list / update   → every column except image               │
//! │  get_with_image              → full row                                │
//! │  image                       → just the bytes                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use knet_core::Product;

/// Fields required to create a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub stock: i64,
    pub image: Vec<u8>,
    /// Account creating the product.
    pub user_id: i64,
}

/// Partial update of a product. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub stock: Option<i64>,
    pub image: Option<Vec<u8>>,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a product and returns it (image included) with its id.
    pub async fn insert(&self, product: NewProduct) -> DbResult<Product> {
        debug!(name = %product.name, user_id = product.user_id, "Inserting product");

        let now = Utc::now();

        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products
                (name, description, price_cents, stock, image, user_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            RETURNING id, name, description, price_cents, stock, image, user_id, created_at, updated_at
            "#,
        )
        .bind(product.name)
        .bind(product.description)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.image)
        .bind(product.user_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by id, without its image bytes.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found (`image` is empty)
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price_cents, stock, user_id, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by id including its image bytes.
    pub async fn get_with_image(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price_cents, stock, image, user_id, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists all products with their images, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price_cents, stock, image, user_id, created_at, updated_at
            FROM products
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Returns only the image bytes of a product.
    pub async fn image(&self, id: i64) -> DbResult<Option<Vec<u8>>> {
        let image: Option<Vec<u8>> = sqlx::query_scalar("SELECT image FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(image)
    }

    /// Applies a partial update and returns the updated product (image included).
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No product with this id
    pub async fn update(&self, id: i64, changes: ProductChanges) -> DbResult<Product> {
        debug!(id, "Updating product");

        let now = Utc::now();

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name = COALESCE(?2, name),
                description = COALESCE(?3, description),
                price_cents = COALESCE(?4, price_cents),
                stock = COALESCE(?5, stock),
                image = COALESCE(?6, image),
                updated_at = ?7
            WHERE id = ?1
            RETURNING id, name, description, price_cents, stock, image, user_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.price_cents)
        .bind(changes.stock)
        .bind(changes.image)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        product.ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product. Orders referencing it go with it.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts total products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
