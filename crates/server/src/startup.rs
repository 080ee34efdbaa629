use std::sync::Arc;

use axum::Router;
use configs::AppConfig;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, ServerState};
use models::db::{connect_with_config, DatabaseConfig};
use service::user::{
    password::Argon2PasswordEncoder, repo::seaorm::SeaOrmUserRepository, UserService,
};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire database, repository, encoder and service together.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<ServerState> {
    let db = connect_with_config(&DatabaseConfig::from(&cfg.database)).await?;

    if cfg.database.auto_migrate {
        migration::Migrator::up(&db, None)
            .await
            .map_err(|e| StartupError::Migration(e.to_string()))?;
        info!("database migrations applied");
    }

    let encoder = Argon2PasswordEncoder::from_config(&cfg.password)
        .map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    let repo = SeaOrmUserRepository::new(db);
    Ok(ServerState::new(UserService::new(Arc::new(repo), Arc::new(encoder))))
}

pub fn build_app(state: ServerState) -> Router {
    routes::build_router(build_cors(), state)
}

/// Resolves on Ctrl+C; never resolves if the handler cannot be installed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C; graceful shutdown disabled");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Public entry: build the app and run the HTTP server until Ctrl+C
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let state = build_state(&cfg).await?;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind((cfg.server.host.as_str(), cfg.server.port)).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "user api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
