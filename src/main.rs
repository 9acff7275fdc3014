mod config;
mod db;
mod error;
mod models;
mod routes;
mod services;

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::routes::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "restaurant_analytics=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    let db = db::create_database(&config.database_url, config.turso_auth_token.as_deref()).await?;

    // A failed probe is logged, not fatal
    match db::ping(&db).await {
        Ok(()) => tracing::info!("Connected to database"),
        Err(e) => tracing::error!("Database connection test failed: {}", e),
    }

    let state = AppState {
        db: Arc::new(db),
        config: config.clone(),
    };

    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::debug!("Default page size: {}", config.default_page_size);

    axum::serve(listener, app).await?;

    Ok(())
}
