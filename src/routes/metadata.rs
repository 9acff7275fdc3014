use axum::{extract::State, routing::get, Json, Router};

use crate::error::{AppError, AppResult};
use crate::models::FilterMetadata;
use crate::routes::AppState;
use crate::services;

pub fn routes() -> Router<AppState> {
    Router::new().route("/metadata/filters", get(get_filters))
}

async fn get_filters(State(state): State<AppState>) -> AppResult<Json<FilterMetadata>> {
    let metadata = services::filter_options(&state.db)
        .await
        .map_err(AppError::conceal)?;
    Ok(Json(metadata))
}
