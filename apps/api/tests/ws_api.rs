//! The `/ws` notification endpoint: handshake auth and live delivery.

mod common;

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::{Method, StatusCode};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use common::TestApp;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Serves the app's router on an ephemeral port.
async fn serve(app: &TestApp) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn next_message(client: &mut Client) -> Message {
    timeout(Duration::from_secs(5), client.next())
        .await
        .expect("no message within 5s")
        .expect("socket closed")
        .unwrap()
}

#[tokio::test]
async fn handshake_requires_access_token() {
    let app = TestApp::new().await;
    let ada = app.signup("ada@example.com", "customer").await;

    let (status, body) = app.call(Method::GET, "/ws", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing bearer token");
    assert_eq!(body["code"], "UNAUTHORIZED");

    let uri = format!("/ws?token={}", ada.refresh_token);
    let (status, body) = app.call(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Expected access token");

    let (status, _) = app.call(Method::GET, "/ws?token=garbage", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call(Method::GET, "/ws", Some(&ada.refresh_token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn valid_token_without_upgrade_gets_json_error() {
    let app = TestApp::new().await;
    let ada = app.signup("ada@example.com", "customer").await;

    // Query token and bearer header both get past auth and stop at the
    // upgrade check instead
    let by_query = format!("/ws?token={}", ada.access_token);
    for (uri, token) in [(by_query.as_str(), None), ("/ws", Some(ada.access_token.as_str()))] {
        let (status, bytes) = app.raw(Method::GET, uri, token, None).await;
        assert!(status.is_client_error(), "{}", status);
        assert_ne!(status, StatusCode::UNAUTHORIZED);

        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn socket_answers_ping_once_and_streams_new_orders() {
    let app = TestApp::new().await;
    let admin = app.signup("admin@example.com", "admin").await;
    let ada = app.signup("ada@example.com", "customer").await;
    let product_id = app.add_product(&admin, 3.0, 4).await;
    let addr = serve(&app).await;

    let url = format!("ws://{}/ws?token={}", addr, ada.access_token);
    let (mut client, response) = connect_async(url).await.unwrap();
    assert_eq!(response.status(), StatusCode::SWITCHING_PROTOCOLS);

    client.send(Message::Ping("are-you-there".into())).await.unwrap();
    assert_eq!(next_message(&mut client).await, Message::Pong("are-you-there".into()));

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/orders/create",
            Some(&ada.access_token),
            Some(json!({ "product_id": product_id, "quantity": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // A second pong would show up here ahead of the event
    let Message::Text(text) = next_message(&mut client).await else {
        panic!("expected a text frame");
    };
    let event: Value = serde_json::from_str(text.as_str()).unwrap();
    assert_eq!(event["event"], "new_order");
    assert_eq!(event["message"], "A new order has been placed");
    assert_eq!(event["order"]["id"], body["order"]["id"]);
    assert_eq!(event["order"]["total_price"], 6.0);

    client.close(None).await.unwrap();
}
