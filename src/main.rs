mod admin;
mod auth;
mod catalog;
mod config;
mod db;
mod error;
mod forms;
mod session;
mod state;
mod web_ui;

use std::sync::Arc;

use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::AppConfig;
use state::AppState;

/// Failures that stop the server before it starts serving
#[derive(Error, Debug)]
enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Failed to initialize database: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Failed to create admin user: {0}")]
    Bootstrap(#[from] error::CatalogError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vegetable_catalog=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = AppConfig::from_env()?;

    let db_path = config.database_path();
    let db = Arc::new(db::init_database(&db_path).await?);
    tracing::info!("Database initialized at {:?}", db_path);

    let state = Arc::new(AppState::with_db(db));

    // Bootstrap superuser so the admin console is reachable on a fresh database
    state
        .auth
        .ensure_admin_user(&config.admin_username, &config.admin_password)
        .await?;

    let counts = state.catalog.counts().await?;
    tracing::info!(
        "Catalog holds {} vegetables, {} instances ({} available), {} farmers",
        counts.vegetables,
        counts.instances,
        counts.instances_available,
        counts.farmers
    );

    let app = web_ui::router()
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Vegetable catalog listening on http://{}", config.bind_addr);
    tracing::info!("Admin console: http://{}/admin/", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
