//! `/api/v1/users` routes.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use knet_core::validation::{require_text, validate_email, validate_name, validate_password};
use knet_core::{Role, User};
use knet_db::UserChanges;

use crate::auth::{AccessClaims, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::password::hash_password_async;
use crate::services::user_service::{Registration, UserService};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/current_user", get(current_user))
        .route("/edit/{id}", put(edit_user))
        .route("/delete/{id}", delete(delete_user))
        .route("/all", get(list_users))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    address: Option<String>,
    phone_number: Option<String>,
    role: Option<String>,
}

/// Public, except that `role: admin` needs an admin's access token.
async fn register(
    State(state): State<AppState>,
    caller: Result<AuthUser, ApiError>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(req) = body?;

    let registration = Registration {
        name: require_text("name", req.name.as_deref())?.to_string(),
        email: require_text("email", req.email.as_deref())?.to_string(),
        password: require_text("password", req.password.as_deref())?.to_string(),
        address: require_text("address", req.address.as_deref())?.to_string(),
        phone_number: require_text("phone_number", req.phone_number.as_deref())?.to_string(),
        role: match req.role.as_deref().map(str::trim) {
            Some(role) if !role.is_empty() => role.parse::<Role>()?,
            _ => Role::default(),
        },
    };

    if registration.role == Role::Admin && !matches!(&caller, Ok(AuthUser(user)) if user.is_admin()) {
        return Err(ApiError::forbidden("Only admins may create admin accounts"));
    }

    let user = UserService::from_state(&state).register(registration).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("User {} has been successfully created", user.name),
            "user": user,
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(req) = body?;

    let (email, password) = match (req.email.as_deref(), req.password.as_deref()) {
        (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
            (email.trim(), password)
        }
        _ => return Err(ApiError::validation("Email and password are required")),
    };

    let session = UserService::from_state(&state).login(email, password).await?;

    Ok(Json(json!({
        "access_token": session.access_token,
        "refresh_token": session.refresh_token,
        "user_id": session.user.id,
    })))
}

/// Uses the bare claims so a deleted account reads as 404 rather than 401.
async fn current_user(
    State(state): State<AppState>,
    AccessClaims(claims): AccessClaims,
) -> ApiResult<Json<Value>> {
    let user = state
        .db
        .users()
        .get_by_id(claims.user_id()?)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(json!({ "user": user })))
}

#[derive(Debug, Default, Deserialize)]
pub struct EditUserRequest {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    address: Option<String>,
    phone_number: Option<String>,
    role: Option<String>,
}

async fn edit_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<EditUserRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    let Json(req) = body?;

    let target = state
        .db
        .users()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if !caller.may_act_on(target.id) {
        return Err(ApiError::forbidden("You are not authorized to update user details"));
    }

    let changes = user_changes(&caller, &target, req).await?;
    let user = state.db.users().update(id, changes).await?;

    info!(user_id = user.id, by = caller.id, "User updated");
    Ok(Json(json!({
        "message": format!("{}'s details have been successfully updated", user.name),
        "user": user,
    })))
}

/// Validates an edit body into column changes. Blank strings count as absent.
async fn user_changes(caller: &User, target: &User, req: EditUserRequest) -> ApiResult<UserChanges> {
    let present = |value: Option<String>| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let name = present(req.name);
    if let Some(name) = &name {
        validate_name("name", name)?;
    }

    let email = present(req.email);
    if let Some(email) = &email {
        validate_email(email)?;
    }

    let role = match present(req.role) {
        Some(role) => {
            let role = role.parse::<Role>()?;
            if role != target.role && !caller.is_admin() {
                return Err(ApiError::forbidden("Only admins may change roles"));
            }
            Some(role)
        }
        None => None,
    };

    let password_hash = match req.password.filter(|p| !p.is_empty()) {
        Some(password) => {
            validate_password(&password)?;
            Some(hash_password_async(password).await?)
        }
        None => None,
    };

    Ok(UserChanges {
        name,
        email,
        password_hash,
        address: present(req.address),
        phone_number: present(req.phone_number),
        role,
    })
}

async fn delete_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    if !caller.is_admin() {
        return Err(ApiError::forbidden("You are not authorized to delete this user"));
    }

    state.db.users().delete(id).await?;

    info!(user_id = id, by = caller.id, "User deleted");
    Ok(Json(json!({ "message": "User deleted successfully" })))
}

async fn list_users(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Value>> {
    user.require_admin()?;

    let users = state.db.users().list().await?;
    Ok(Json(json!({ "users": users })))
}
