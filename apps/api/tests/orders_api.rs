//! Order placement, status and access rules over HTTP.

mod common;

use axum::http::{Method, StatusCode};
use futures_util::future::join_all;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn placing_order_decrements_stock_and_snapshots_total() {
    let app = TestApp::new().await;
    let admin = app.signup("admin@example.com", "admin").await;
    let ada = app.signup("ada@example.com", "customer").await;
    let product_id = app.add_product(&admin, 12.5, 10).await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/orders/create",
            Some(&ada.access_token),
            Some(json!({ "product_id": product_id, "quantity": 3 })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Order placed successfully");
    assert_eq!(body["order"]["quantity"], 3);
    assert_eq!(body["order"]["total_price"], 37.5);
    assert_eq!(body["order"]["status"], "pending");
    assert_eq!(body["order"]["user_id"], ada.user_id);
    assert_eq!(app.product_stock(product_id).await, 7);
    assert_eq!(app.state.db.orders().count().await.unwrap(), 1);

    // A later price change leaves the stored total alone
    app.call(
        Method::PUT,
        &format!("/api/v1/products/{}", product_id),
        Some(&admin.access_token),
        Some(json!({ "price": 99.0 })),
    )
    .await;
    let order_id = body["order"]["id"].as_i64().unwrap();
    let (_, body) = app
        .call(
            Method::GET,
            &format!("/api/v1/orders/{}", order_id),
            Some(&ada.access_token),
            None,
        )
        .await;
    assert_eq!(body["total_price"], 37.5);
}

#[tokio::test]
async fn order_above_stock_is_rejected_without_side_effects() {
    let app = TestApp::new().await;
    let admin = app.signup("admin@example.com", "admin").await;
    let ada = app.signup("ada@example.com", "customer").await;
    let product_id = app.add_product(&admin, 4.0, 2).await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/orders/create",
            Some(&ada.access_token),
            Some(json!({ "product_id": product_id, "quantity": 3 })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Insufficient stock available");
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");
    assert_eq!(app.product_stock(product_id).await, 2);
    assert_eq!(app.state.db.orders().count().await.unwrap(), 0);
}

#[tokio::test]
async fn order_input_errors() {
    let app = TestApp::new().await;
    let admin = app.signup("admin@example.com", "admin").await;
    let ada = app.signup("ada@example.com", "customer").await;
    let product_id = app.add_product(&admin, 4.0, 2).await;

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/orders/create",
            Some(&ada.access_token),
            Some(json!({ "product_id": product_id, "quantity": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/orders/create",
            Some(&ada.access_token),
            Some(json!({ "product_id": product_id })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "quantity is required");

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/orders/create",
            Some(&ada.access_token),
            Some(json!({ "product_id": 4242, "quantity": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The product lookup comes before the quantity check
    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/orders/create",
            Some(&ada.access_token),
            Some(json!({ "product_id": 4242, "quantity": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product not found");

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/orders/create",
            None,
            Some(json!({ "product_id": product_id, "quantity": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn place_alias_accepts_legacy_email_field() {
    let app = TestApp::new().await;
    let admin = app.signup("admin@example.com", "admin").await;
    let ada = app.signup("ada@example.com", "customer").await;
    let product_id = app.add_product(&admin, 4.0, 2).await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/orders/place",
            Some(&ada.access_token),
            Some(json!({ "email": "ada@example.com", "product_id": product_id, "quantity": 2 })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(app.product_stock(product_id).await, 0);
}

#[tokio::test]
async fn concurrent_orders_never_oversell() {
    let app = TestApp::new().await;
    let admin = app.signup("admin@example.com", "admin").await;
    let ada = app.signup("ada@example.com", "customer").await;
    let product_id = app.add_product(&admin, 1.0, 5).await;

    let attempts = (0..8).map(|_| {
        app.call(
            Method::POST,
            "/api/v1/orders/create",
            Some(&ada.access_token),
            Some(json!({ "product_id": product_id, "quantity": 2 })),
        )
    });
    let results = join_all(attempts).await;

    let placed = results
        .iter()
        .filter(|(status, _)| *status == StatusCode::CREATED)
        .count();
    let rejected = results
        .iter()
        .filter(|(status, _)| *status == StatusCode::BAD_REQUEST)
        .count();

    assert_eq!(placed, 2);
    assert_eq!(rejected, 6);
    assert_eq!(app.product_stock(product_id).await, 1);
    assert_eq!(app.state.db.orders().count().await.unwrap(), 2);
}

#[tokio::test]
async fn placed_order_is_pushed_to_buyer_channel() {
    let app = TestApp::new().await;
    let admin = app.signup("admin@example.com", "admin").await;
    let ada = app.signup("ada@example.com", "customer").await;
    let product_id = app.add_product(&admin, 2.5, 5).await;

    let mut ada_events = app.state.hub.subscribe(ada.user_id).await;
    let mut admin_events = app.state.hub.subscribe(admin.user_id).await;

    let (_, body) = app
        .call(
            Method::POST,
            "/api/v1/orders/create",
            Some(&ada.access_token),
            Some(json!({ "product_id": product_id, "quantity": 2 })),
        )
        .await;

    let event = ada_events.recv().await.unwrap();
    assert_eq!(event.event, "new_order");
    assert_eq!(event.message, "A new order has been placed");
    assert_eq!(event.order.id, body["order"]["id"].as_i64().unwrap());
    assert_eq!(event.order.total_price, 5.0);
    assert!(admin_events.try_recv().is_err());
}

#[tokio::test]
async fn status_update_accepts_any_transition_and_rejects_unknown_values() {
    let app = TestApp::new().await;
    let admin = app.signup("admin@example.com", "admin").await;
    let ada = app.signup("ada@example.com", "customer").await;
    let product_id = app.add_product(&admin, 1.0, 5).await;

    let (_, body) = app
        .call(
            Method::POST,
            "/api/v1/orders/create",
            Some(&ada.access_token),
            Some(json!({ "product_id": product_id, "quantity": 1 })),
        )
        .await;
    let uri = format!("/api/v1/orders/{}", body["order"]["id"]);

    for status_value in ["delivered", "pending", "canceled", "shipped", "pending"] {
        let (status, body) = app
            .call(
                Method::PUT,
                &uri,
                Some(&ada.access_token),
                Some(json!({ "status": status_value })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["order"]["status"], status_value);
    }

    let (status, body) = app
        .call(Method::PUT, &uri, Some(&ada.access_token), Some(json!({ "status": "lost" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = app
        .call(Method::PUT, &uri, Some(&ada.access_token), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn orders_are_visible_to_owner_and_admin_only() {
    let app = TestApp::new().await;
    let admin = app.signup("admin@example.com", "admin").await;
    let ada = app.signup("ada@example.com", "customer").await;
    let bob = app.signup("bob@example.com", "customer").await;
    let product_id = app.add_product(&admin, 1.0, 5).await;

    let (_, body) = app
        .call(
            Method::POST,
            "/api/v1/orders/create",
            Some(&ada.access_token),
            Some(json!({ "product_id": product_id, "quantity": 1 })),
        )
        .await;
    let uri = format!("/api/v1/orders/{}", body["order"]["id"]);

    let (status, _) = app.call(Method::GET, &uri, Some(&bob.access_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .call(Method::PUT, &uri, Some(&bob.access_token), Some(json!({ "status": "canceled" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.call(Method::DELETE, &uri, Some(&bob.access_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.call(Method::GET, &uri, Some(&admin.access_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app
        .call(Method::GET, "/api/v1/orders/all", Some(&bob.access_token), None)
        .await;
    assert_eq!(body["orders"].as_array().unwrap().len(), 0);
    let (_, body) = app
        .call(Method::GET, "/api/v1/orders/all", Some(&admin.access_token), None)
        .await;
    assert_eq!(body["orders"].as_array().unwrap().len(), 1);

    let (status, body) = app.call(Method::DELETE, &uri, Some(&ada.access_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Order deleted successfully");
    // Deleting does not restock
    assert_eq!(app.product_stock(product_id).await, 4);

    let (status, _) = app.call(Method::GET, &uri, Some(&ada.access_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
