//! `/api/v1/orders` routes.
//!
//! Orders belong to the user who placed them. Owners and admins may read,
//! update and delete an order; listing shows admins every order.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use knet_core::validation::{require, require_text};
use knet_core::{Order, OrderStatus, User};

use crate::auth::AuthUser;
use crate::dto::OrderDto;
use crate::error::{ApiError, ApiResult};
use crate::services::OrderService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_order))
        .route("/place", post(create_order))
        .route("/all", get(list_orders))
        .route(
            "/{id}",
            get(get_order).put(update_order).delete(delete_order),
        )
}

/// Unknown fields (older clients send `email`) are ignored.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    product_id: Option<i64>,
    quantity: Option<i64>,
}

async fn create_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(req) = body?;
    let product_id = require("product_id", req.product_id)?;
    let quantity = require("quantity", req.quantity)?;

    let order = OrderService::from_state(&state)
        .place_order(user.id, product_id, quantity)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Order placed successfully",
            "order": OrderDto::from(order),
        })),
    ))
}

async fn list_orders(State(state): State<AppState>, AuthUser(user): AuthUser) -> ApiResult<Json<Value>> {
    let orders = if user.is_admin() {
        state.db.orders().list().await?
    } else {
        state.db.orders().list_for_user(user.id).await?
    };

    let orders: Vec<OrderDto> = orders.into_iter().map(OrderDto::from).collect();
    Ok(Json(json!({ "orders": orders })))
}

/// Loads an order and checks the caller may act on it.
async fn owned_order(state: &AppState, user: &User, id: i64) -> ApiResult<Order> {
    let order = OrderService::from_state(state).find(id).await?;

    if !user.may_act_on(order.user_id) {
        return Err(ApiError::forbidden("You are not authorized to access this order"));
    }

    Ok(order)
}

async fn get_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<OrderDto>> {
    let Path(id) = path?;
    let order = owned_order(&state, &user, id).await?;
    Ok(Json(order.into()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    status: Option<String>,
}

async fn update_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateOrderRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    let Json(req) = body?;
    let status: OrderStatus = require_text("status", req.status.as_deref())?.parse()?;

    let previous = owned_order(&state, &user, id).await?;
    let order = state.db.orders().update_status(id, status).await?;

    info!(
        order_id = id,
        from = %previous.status,
        to = %order.status,
        by = user.id,
        "Order status updated"
    );
    Ok(Json(json!({
        "message": "Order updated successfully",
        "order": OrderDto::from(order),
    })))
}

async fn delete_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    owned_order(&state, &user, id).await?;
    state.db.orders().delete(id).await?;

    info!(order_id = id, by = user.id, "Order deleted");
    Ok(Json(json!({ "message": "Order deleted successfully" })))
}
