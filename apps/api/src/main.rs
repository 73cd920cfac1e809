//! Knet API server binary.

use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use knet_api::services::UserService;
use knet_api::{build_router, ApiConfig, AppState};
use knet_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is normal outside development
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,knet_api=debug")),
        )
        .with_target(true)
        .init();

    info!("Starting Knet API server...");

    let config = ApiConfig::load()?;
    info!(
        address = %config.bind_address(),
        database = %config.database_path,
        "Configuration loaded"
    );

    let db = Database::new(config.db_config()).await?;
    info!("Database ready");

    let state = AppState::new(db.clone(), config.clone());

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        let name = config.admin_name.as_deref().unwrap_or("Administrator");
        match UserService::from_state(&state).ensure_admin(name, email, password).await {
            Ok(true) => info!(%email, "Admin account created"),
            Ok(false) => info!(%email, "Admin account already exists"),
            Err(e) => warn!(%email, error = %e, "Failed to create admin account"),
        }
    }

    let listener = TcpListener::bind(config.bind_address()).await?;
    info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(?e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(?e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
