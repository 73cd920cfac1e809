//! Workflows that span more than one repository.
//!
//! Route handlers stay thin: they parse and authorize, then call into here.

pub mod order_service;
pub mod user_service;

pub use order_service::OrderService;
pub use user_service::UserService;
