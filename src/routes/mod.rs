pub mod analytics;
pub mod metadata;

use axum::{routing::get, Router};
use libsql::Database;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Config,
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(analytics::routes())
        .merge(metadata::routes());

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}
