//! Shared application state.

use std::sync::Arc;

use knet_db::Database;

use crate::auth::JwtManager;
use crate::config::ApiConfig;
use crate::hub::NotificationHub;

/// State handed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub hub: NotificationHub,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let jwt = JwtManager::new(
            &config.jwt_secret(),
            config.jwt_access_lifetime_secs,
            config.jwt_refresh_lifetime_secs,
        );

        AppState {
            db,
            jwt: Arc::new(jwt),
            hub: NotificationHub::new(),
            config: Arc::new(config),
        }
    }
}
