//! # User Repository
//!
//! Database operations for accounts.
//!
//! Emails are compared case-insensitively (`COLLATE NOCASE` on the column),
//! so `Ada@Example.com` and `ada@example.com` are the same account.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use knet_core::{Role, User};

/// Fields required to create an account. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub address: String,
    pub phone_number: String,
    pub role: Role,
}

/// Partial update of an account. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub role: Option<Role>,
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a new account and returns it with its assigned id.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Email already registered
    pub async fn insert(&self, user: NewUser) -> DbResult<User> {
        debug!(email = %user.email, role = %user.role, "Inserting user");

        let now = Utc::now();

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users
                (name, email, password_hash, address, phone_number, role, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            RETURNING id, name, email, password_hash, address, phone_number, role, created_at, updated_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.address)
        .bind(&user.phone_number)
        .bind(user.role)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(&user.email))
    }

    /// Gets a user by id.
    ///
    /// ## Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - User not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, address, phone_number, role, created_at, updated_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by email (case-insensitive). Used by login.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, address, phone_number, role, created_at, updated_at
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Lists every account, oldest first.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, address, phone_number, role, created_at, updated_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Applies a partial update and returns the updated account.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No user with this id
    /// * `Err(DbError::UniqueViolation)` - New email belongs to another account
    pub async fn update(&self, id: i64, changes: UserChanges) -> DbResult<User> {
        debug!(id, "Updating user");

        let now = Utc::now();
        let email = changes.email.clone().unwrap_or_default();

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE(?2, name),
                email = COALESCE(?3, email),
                password_hash = COALESCE(?4, password_hash),
                address = COALESCE(?5, address),
                phone_number = COALESCE(?6, phone_number),
                role = COALESCE(?7, role),
                updated_at = ?8
            WHERE id = ?1
            RETURNING id, name, email, password_hash, address, phone_number, role, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.password_hash)
        .bind(changes.address)
        .bind(changes.phone_number)
        .bind(changes.role)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(&email))?;

        user.ok_or_else(|| DbError::not_found("User", id))
    }

    /// Deletes an account and its orders. Fails with
    /// [`DbError::StillReferenced`] while the account owns products.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting user");

        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from(e).blocked_delete("User", id, "products"))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    /// Counts accounts (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
