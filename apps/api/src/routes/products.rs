//! `/api/v1/products` routes.
//!
//! Reads are open to any signed-in user; writes need the admin role.
//! Images travel as base64 in JSON and are stored as raw bytes.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use knet_core::validation::{
    require, require_text, validate_image, validate_name, validate_price, validate_stock,
};
use knet_db::{NewProduct, ProductChanges};

use crate::auth::AuthUser;
use crate::dto::{decode_image, ProductDto};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add", post(add_product))
        .route("/create", post(add_product))
        .route("/all", get(list_products))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/image", get(product_image))
}

#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    name: Option<String>,
    description: Option<String>,
    price: Option<f64>,
    stock: Option<i64>,
    /// Base64, optionally as a `data:` URL.
    image: Option<String>,
}

async fn add_product(
    State(state): State<AppState>,
    user: AuthUser,
    body: Result<Json<ProductRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    user.require_admin()?;
    let Json(req) = body?;

    let name = require_text("name", req.name.as_deref())?.to_string();
    validate_name("name", &name)?;
    let price = validate_price(require("price", req.price)?)?;
    let stock = require("stock", req.stock)?;
    validate_stock(stock)?;
    let image = decode_image(require_text("image", req.image.as_deref())?)?;
    validate_image(&image)?;

    let product = state
        .db
        .products()
        .insert(NewProduct {
            name,
            description: req.description.unwrap_or_default().trim().to_string(),
            price_cents: price.cents(),
            stock,
            image,
            user_id: user.0.id,
        })
        .await?;

    info!(product_id = product.id, by = user.0.id, "Product created");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Product created successfully",
            "product": ProductDto::from(product),
        })),
    ))
}

async fn list_products(State(state): State<AppState>, _user: AuthUser) -> ApiResult<Json<Value>> {
    let products: Vec<ProductDto> = state
        .db
        .products()
        .list()
        .await?
        .into_iter()
        .map(ProductDto::from)
        .collect();

    Ok(Json(json!({ "products": products })))
}

async fn get_product(
    State(state): State<AppState>,
    _user: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<ProductDto>> {
    let Path(id) = path?;
    let product = state
        .db
        .products()
        .get_with_image(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    Ok(Json(product.into()))
}

async fn product_image(
    State(state): State<AppState>,
    _user: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = path?;
    let image = state
        .db
        .products()
        .image(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    Ok(([(CONTENT_TYPE, "application/octet-stream")], image))
}

async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<ProductRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    user.require_admin()?;
    let Json(req) = body?;

    let mut changes = ProductChanges::default();

    if let Some(name) = req.name {
        validate_name("name", &name)?;
        changes.name = Some(name.trim().to_string());
    }
    changes.description = req.description.map(|d| d.trim().to_string());
    if let Some(price) = req.price {
        changes.price_cents = Some(validate_price(price)?.cents());
    }
    if let Some(stock) = req.stock {
        validate_stock(stock)?;
        changes.stock = Some(stock);
    }
    if let Some(encoded) = req.image.as_deref().filter(|s| !s.trim().is_empty()) {
        let image = decode_image(encoded)?;
        validate_image(&image)?;
        changes.image = Some(image);
    }

    let product = state.db.products().update(id, changes).await?;

    info!(product_id = id, by = user.0.id, "Product updated");
    Ok(Json(json!({
        "message": "Product updated successfully",
        "product": ProductDto::from(product),
    })))
}

async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    user.require_admin()?;

    state.db.products().delete(id).await?;

    info!(product_id = id, by = user.0.id, "Product deleted");
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}
