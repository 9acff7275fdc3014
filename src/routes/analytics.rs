use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;

use crate::error::AppResult;
use crate::models::{
    CustomersPage, DashboardData, FilterParams, ListParams, ListQuery, OperationalData,
    ProductsPage, SalesFilters,
};
use crate::routes::AppState;
use crate::services;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/analytics/dashboard", post(get_dashboard))
        .route("/analytics/products", get(get_products))
        .route("/analytics/customers", get(get_customers))
        .route("/analytics/operational", post(get_operational))
}

/// Filters from a JSON body. Missing, empty or malformed bodies mean
/// "no filters" rather than a client error.
fn sales_filters(body: &[u8]) -> SalesFilters {
    let params = if body.iter().all(u8::is_ascii_whitespace) {
        FilterParams::default()
    } else {
        serde_json::from_slice(body).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable filter body: {}", e);
            FilterParams::default()
        })
    };

    SalesFilters::normalize(params, Local::now().date_naive())
}

fn list_query(query: Result<Query<ListQuery>, QueryRejection>) -> ListQuery {
    match query {
        Ok(Query(query)) => query,
        Err(e) => {
            tracing::warn!("Ignoring unreadable query string: {}", e);
            ListQuery::default()
        }
    }
}

async fn get_dashboard(State(state): State<AppState>, body: Bytes) -> AppResult<Json<DashboardData>> {
    let filters = sales_filters(&body);
    let data = services::dashboard_data(&state.db, &filters).await?;
    Ok(Json(data))
}

async fn get_operational(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<OperationalData>> {
    let filters = sales_filters(&body);
    let data = services::operational_data(&state.db, &filters).await?;
    Ok(Json(data))
}

async fn get_products(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> AppResult<Json<ProductsPage>> {
    let params = ListParams::normalize(list_query(query), state.config.default_page_size);
    let page = services::products_page(&state.db, &params).await?;
    Ok(Json(page))
}

async fn get_customers(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> AppResult<Json<CustomersPage>> {
    let params = ListParams::normalize(list_query(query), state.config.default_page_size);
    let page = services::customers_page(&state.db, &params).await?;
    Ok(Json(page))
}
