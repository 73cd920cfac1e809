//! Order notification hub.
//!
//! Keeps one broadcast channel per user and serves the `/ws` endpoint that
//! feeds those channels to connected clients.
//!
//! ## Event Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Order Notification Flow                              │
//! │                                                                         │
//! │  POST /orders/create ──► place_order ──► hub.notify(user_id, event)    │
//! │                                              │                          │
//! │                          ┌───────────────────┘                          │
//! │                          ▼                                              │
//! │              broadcast::Sender (per user)                               │
//! │                 │            │                                          │
//! │                 ▼            ▼                                          │
//! │           socket A       socket B   (every /ws connection of the user) │
//! │                                                                         │
//! │  Delivery is best effort: no subscribers means the event is dropped,   │
//! │  and a lagging socket skips what it missed.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::rejection::QueryRejection;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::auth::extract_bearer_token;
use crate::dto::OrderDto;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Buffered events per user before slow sockets start lagging.
const CHANNEL_CAPACITY: usize = 64;

/// Ping interval to keep connections alive.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Client messages are ignored, so they never need to be large.
const MAX_MESSAGE_SIZE: usize = 64 * 1024;

/// Event pushed to a user's sockets.
#[derive(Debug, Clone, Serialize)]
pub struct OrderEvent {
    pub event: &'static str,
    pub message: &'static str,
    pub order: OrderDto,
}

impl OrderEvent {
    pub fn new_order(order: OrderDto) -> Self {
        OrderEvent {
            event: "new_order",
            message: "A new order has been placed",
            order,
        }
    }
}

/// Registry of per-user broadcast channels.
#[derive(Clone, Default)]
pub struct NotificationHub {
    channels: Arc<RwLock<HashMap<i64, broadcast::Sender<OrderEvent>>>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receiver for every event sent to `user_id` from now on.
    pub async fn subscribe(&self, user_id: i64) -> broadcast::Receiver<OrderEvent> {
        let mut channels = self.channels.write().await;
        channels
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Sends an event to the user's subscribers. Returns how many received it.
    pub async fn notify(&self, user_id: i64, event: OrderEvent) -> usize {
        let channels = self.channels.read().await;
        match channels.get(&user_id) {
            Some(tx) => tx.send(event).unwrap_or(0),
            None => {
                debug!(user_id, "No subscribers for notification");
                0
            }
        }
    }

    /// Live subscribers for a user.
    pub async fn subscriber_count(&self, user_id: i64) -> usize {
        self.channels
            .read()
            .await
            .get(&user_id)
            .map_or(0, |tx| tx.receiver_count())
    }

    /// Drops the user's channel once nothing listens to it.
    async fn release(&self, user_id: i64) {
        let mut channels = self.channels.write().await;
        if channels
            .get(&user_id)
            .is_some_and(|tx| tx.receiver_count() == 0)
        {
            channels.remove(&user_id);
        }
    }
}

// =============================================================================
// WebSocket Handler
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct WsParams {
    token: Option<String>,
}

/// `GET /ws`. Browsers can't set headers on a websocket handshake, so the
/// access token may come as `?token=` as well as a bearer header.
///
/// Authentication runs before the upgrade check, so a plain HTTP request
/// with a bad token gets 401 rather than an upgrade error.
pub async fn ws_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<AppState>,
    query: Result<Query<WsParams>, QueryRejection>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let Query(params) = query?;
    let token = match params.token {
        Some(token) => token,
        None => headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(extract_bearer_token)
            .map(str::to_string)
            .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?,
    };

    let claims = state.jwt.validate_access_token(&token)?;
    let user_id = claims.user_id()?;
    let ws = ws?;

    info!(user_id, "New WebSocket connection");
    let hub = state.hub.clone();
    Ok(ws
        .max_message_size(MAX_MESSAGE_SIZE)
        .on_upgrade(move |socket| handle_socket(socket, hub, user_id))
        .into_response())
}

async fn handle_socket(socket: WebSocket, hub: NotificationHub, user_id: i64) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = hub.subscribe(user_id).await;

    let (outgoing_tx, mut outgoing_rx) = mpsc::channel::<Message>(64);

    // Outgoing message task
    let outgoing_handle = tokio::spawn(async move {
        while let Some(msg) = outgoing_rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    // Event forwarding task
    let outgoing_tx_events = outgoing_tx.clone();
    let forward_handle = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => {
                        if outgoing_tx_events.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(user_id, ?e, "Failed to encode event"),
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(user_id, skipped, "Notification receiver lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // Ping task
    let outgoing_tx_ping = outgoing_tx;
    let ping_handle = tokio::spawn(async move {
        let mut ping_interval = interval(PING_INTERVAL);
        loop {
            ping_interval.tick().await;
            if outgoing_tx_ping
                .send(Message::Ping(axum::body::Bytes::new()))
                .await
                .is_err()
            {
                break;
            }
        }
    });

    // Receive loop: only close frames matter, pongs are sent by the library
    loop {
        match receiver.next().await {
            Some(Ok(Message::Close(_))) => {
                info!(user_id, "Client requested close");
                break;
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                warn!(user_id, ?e, "WebSocket error");
                break;
            }
            None => {
                info!(user_id, "Client disconnected");
                break;
            }
        }
    }

    // Cleanup
    ping_handle.abort();
    forward_handle.abort();
    outgoing_handle.abort();
    // The aborted forwarder drops its receiver asynchronously; wait for it.
    let _ = forward_handle.await;
    hub.release(user_id).await;
}
