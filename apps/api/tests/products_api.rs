//! Catalog routes over HTTP.

mod common;

use axum::http::{Method, StatusCode};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn admin_adds_product_with_base64_image() {
    let app = TestApp::new().await;
    let admin = app.signup("admin@example.com", "admin").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/products/add",
            Some(&admin.access_token),
            Some(json!({
                "name": "Teapot",
                "price": 19.99,
                "stock": 3,
                "image": BASE64.encode(b"teapot-bytes"),
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Product created successfully");
    assert_eq!(body["product"]["price"], 19.99);
    assert_eq!(body["product"]["description"], "");
    assert_eq!(body["product"]["image"], BASE64.encode(b"teapot-bytes"));
    assert_eq!(body["product"]["user_id"], admin.user_id);

    let id = body["product"]["id"].as_i64().unwrap();
    let (status, bytes) = app
        .raw(
            Method::GET,
            &format!("/api/v1/products/{}/image", id),
            Some(&admin.access_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"teapot-bytes".to_vec());
}

#[tokio::test]
async fn add_product_validation() {
    let app = TestApp::new().await;
    let admin = app.signup("admin@example.com", "admin").await;
    let image = BASE64.encode(b"img");

    let cases = [
        json!({ "price": 1.0, "stock": 1, "image": image }),
        json!({ "name": "X", "price": 0.0, "stock": 1, "image": image }),
        json!({ "name": "X", "price": -3.5, "stock": 1, "image": image }),
        json!({ "name": "X", "price": 1.0, "stock": -1, "image": image }),
        json!({ "name": "X", "price": 1.0, "stock": 1 }),
        json!({ "name": "X", "price": 1.0, "stock": 1, "image": "%%%" }),
    ];

    for case in cases {
        let (status, body) = app
            .call(
                Method::POST,
                "/api/v1/products/add",
                Some(&admin.access_token),
                Some(case.clone()),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "case {} gave {}", case, body);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    assert_eq!(app.state.db.products().count().await.unwrap(), 0);
}

#[tokio::test]
async fn customers_cannot_write_products() {
    let app = TestApp::new().await;
    let admin = app.signup("admin@example.com", "admin").await;
    let ada = app.signup("ada@example.com", "customer").await;
    let id = app.add_product(&admin, 5.0, 1).await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/products/add",
            Some(&ada.access_token),
            Some(json!({ "name": "X", "price": 1.0, "stock": 1, "image": "aW1n" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Unauthorized access");

    let uri = format!("/api/v1/products/{}", id);
    let (status, _) = app
        .call(Method::PUT, &uri, Some(&ada.access_token), Some(json!({ "stock": 100 })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.call(Method::DELETE, &uri, Some(&ada.access_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Still there for everybody to read
    let (status, body) = app.call(Method::GET, &uri, Some(&ada.access_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stock"], 1);
}

#[tokio::test]
async fn admin_updates_and_deletes_product() {
    let app = TestApp::new().await;
    let admin = app.signup("admin@example.com", "admin").await;
    let id = app.add_product(&admin, 5.0, 1).await;
    let uri = format!("/api/v1/products/{}", id);

    let (status, body) = app
        .call(
            Method::PUT,
            &uri,
            Some(&admin.access_token),
            Some(json!({ "price": 7.25, "stock": 9 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product updated successfully");
    assert_eq!(body["product"]["price"], 7.25);
    assert_eq!(body["product"]["stock"], 9);
    assert_eq!(body["product"]["name"], "Desk Lamp");

    let (status, _) = app
        .call(Method::PUT, &uri, Some(&admin.access_token), Some(json!({ "stock": -2 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.call(Method::DELETE, &uri, Some(&admin.access_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product deleted successfully");

    let (status, body) = app.call(Method::GET, &uri, Some(&admin.access_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product not found");

    let (status, _) = app.call(Method::DELETE, &uri, Some(&admin.access_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_products() {
    let app = TestApp::new().await;
    let admin = app.signup("admin@example.com", "admin").await;
    app.add_product(&admin, 1.0, 1).await;
    app.add_product(&admin, 2.0, 2).await;

    let (status, body) = app
        .call(Method::GET, "/api/v1/products/all", Some(&admin.access_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[1]["price"], 2.0);

    let (status, _) = app.call(Method::GET, "/api/v1/products/all", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
