//! Account registration, login and token refresh.

use std::sync::Arc;

use tracing::{info, warn};

use knet_core::validation::{validate_email, validate_name, validate_password};
use knet_core::{Role, User};
use knet_db::{Database, NewUser};

use crate::auth::{Claims, JwtManager};
use crate::error::{ApiError, ApiResult};
use crate::password::{hash_password_async, verify_password_async};
use crate::state::AppState;

/// Validated-on-use input for a new account.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub phone_number: String,
    pub role: Role,
}

/// Tokens issued by a successful login.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct UserService {
    db: Database,
    jwt: Arc<JwtManager>,
}

impl UserService {
    pub fn new(db: Database, jwt: Arc<JwtManager>) -> Self {
        UserService { db, jwt }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.db.clone(), state.jwt.clone())
    }

    /// Creates an account. Duplicate emails surface as 409.
    pub async fn register(&self, registration: Registration) -> ApiResult<User> {
        let email = registration.email.trim().to_string();
        validate_name("name", &registration.name)?;
        validate_email(&email)?;
        validate_password(&registration.password)?;

        let password_hash = hash_password_async(registration.password).await?;

        let user = self
            .db
            .users()
            .insert(NewUser {
                name: registration.name.trim().to_string(),
                email,
                password_hash,
                address: registration.address.trim().to_string(),
                phone_number: registration.phone_number.trim().to_string(),
                role: registration.role,
            })
            .await?;

        info!(user_id = user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Checks credentials and issues an access/refresh token pair.
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<Session> {
        let invalid = || ApiError::unauthorized("Invalid email or password");

        let user = match self.db.users().get_by_email(email).await? {
            Some(user) => user,
            None => {
                warn!("Login attempt for unknown email");
                return Err(invalid());
            }
        };

        let matches =
            verify_password_async(password.to_string(), user.password_hash.clone()).await?;
        if !matches {
            warn!(user_id = user.id, "Login attempt with wrong password");
            return Err(invalid());
        }

        let access_token = self.jwt.generate_access_token(user.id, user.role)?;
        let refresh_token = self.jwt.generate_refresh_token(user.id, user.role)?;

        info!(user_id = user.id, "User logged in");
        Ok(Session {
            user,
            access_token,
            refresh_token,
        })
    }

    /// New access token for the account behind a refresh token.
    pub async fn refresh(&self, claims: &Claims) -> ApiResult<String> {
        let user = self
            .db
            .users()
            .get_by_id(claims.user_id()?)
            .await?
            .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;

        self.jwt.generate_access_token(user.id, user.role)
    }

    /// Creates the configured admin account unless the email is taken.
    /// Returns whether an account was created.
    pub async fn ensure_admin(&self, name: &str, email: &str, password: &str) -> ApiResult<bool> {
        if self.db.users().get_by_email(email).await?.is_some() {
            return Ok(false);
        }

        self.register(Registration {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            address: String::new(),
            phone_number: String::new(),
            role: Role::Admin,
        })
        .await?;

        Ok(true)
    }
}
