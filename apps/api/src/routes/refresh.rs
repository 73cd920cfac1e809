//! `POST /api/v1/refresh-token`.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::RefreshClaims;
use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;

/// Trades a refresh token for a new access token. Access tokens are refused
/// by the extractor.
pub async fn refresh_token(
    State(state): State<AppState>,
    RefreshClaims(claims): RefreshClaims,
) -> ApiResult<Json<Value>> {
    let access_token = UserService::from_state(&state).refresh(&claims).await?;
    Ok(Json(json!({ "access_token": access_token })))
}
