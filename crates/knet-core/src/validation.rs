//! # Validation Module
//!
//! Input validation for registration, catalog and order requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: JSON extraction (axum)                                       │
//! │  └── Type validation (deserialization) → 422                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Route handlers                                               │
//! │  └── THIS MODULE: presence and business rules → 400                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE(email) → 409                                               │
//! │  ├── CHECK(stock >= 0), CHECK(quantity > 0)                            │
//! │  └── Foreign keys with ON DELETE CASCADE                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use knet_core::validation::{validate_email, validate_quantity};
//!
//! assert!(validate_email("shopper@example.com").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_EMAIL_LENGTH, MAX_NAME_LENGTH, MIN_PASSWORD_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Presence
// =============================================================================

/// Unwraps an optional request field, rejecting absent or blank strings.
///
/// Returns the trimmed value.
///
/// ## Example
/// ```rust
/// use knet_core::validation::require_text;
///
/// assert_eq!(require_text("name", Some("  Ada ")).unwrap(), "Ada");
/// assert!(require_text("name", Some("   ")).is_err());
/// assert!(require_text("name", None).is_err());
/// ```
pub fn require_text<'a>(field: &str, value: Option<&'a str>) -> ValidationResult<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::required(field)),
    }
}

/// Unwraps an optional non-string request field.
pub fn require<T>(field: &str, value: Option<T>) -> ValidationResult<T> {
    value.ok_or_else(|| ValidationError::required(field))
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (user or product).
///
/// ## Rules
/// - Must not be blank
/// - At most [`MAX_NAME_LENGTH`] characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required(field));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates the syntax of an email address.
///
/// ## Rules
/// - Exactly one `@` with a non-empty local part
/// - Domain has at least two non-empty dot-separated labels
/// - No whitespace, at most [`MAX_EMAIL_LENGTH`] characters
///
/// ## Example
/// ```rust
/// use knet_core::validation::validate_email;
///
/// assert!(validate_email("a.b@shop.example").is_ok());
/// assert!(validate_email("no-at-sign").is_err());
/// assert!(validate_email("trailing@dot.").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::required("email"));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LENGTH,
        });
    }

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid("missing '@'"))?;

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("expected exactly one '@' after a local part"));
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid("domain must look like example.com"));
    }

    Ok(())
}

/// Validates a new password.
///
/// ## Rules
/// - At least [`MIN_PASSWORD_LENGTH`] characters
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an order quantity. Must be strictly positive.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Converts a decimal price to [`Money`], rejecting anything not strictly
/// positive once rounded to cents.
///
/// ## Example
/// ```rust
/// use knet_core::validation::validate_price;
///
/// assert_eq!(validate_price(12.5).unwrap().cents(), 1250);
/// assert!(validate_price(0.001).is_err()); // rounds to zero
/// assert!(validate_price(-1.0).is_err());
/// ```
pub fn validate_price(price: f64) -> ValidationResult<Money> {
    let money = Money::from_decimal(price).ok_or_else(|| ValidationError::InvalidFormat {
        field: "price".to_string(),
        reason: "not a finite amount".to_string(),
    })?;

    if !money.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    Ok(money)
}

/// Validates a stock level. Zero is allowed (sold out).
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "stock".to_string(),
        });
    }
    Ok(())
}

/// Validates decoded product image bytes.
pub fn validate_image(bytes: &[u8]) -> ValidationResult<()> {
    if bytes.is_empty() {
        return Err(ValidationError::required("image"));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
