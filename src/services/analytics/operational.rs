use libsql::Database;

use crate::db::row::{get_f64, get_i64, get_string};
use crate::db::SortOrder;
use crate::error::AppResult;
use crate::models::{
    ChannelPerformance, NotComputed, OperationalData, OperationalKpis, PaymentMethodStats,
    SalesFilters, StorePerformance,
};
use crate::services::analytics::base::{sales_base_query, with_channels, with_stores};

pub async fn channel_performance(
    db: &Database,
    filters: &SalesFilters,
) -> AppResult<Vec<ChannelPerformance>> {
    let query = with_channels(sales_base_query(filters))
        .select("channels.name")
        .select("COUNT(DISTINCT sales.id) AS order_count")
        .select("COALESCE(SUM(sales.total_amount), 0) AS revenue")
        .group_by("channels.name")
        .order_by("revenue", SortOrder::Desc)
        .order_by("channels.name", SortOrder::Asc);

    query
        .fetch_all(db, |row| {
            Ok(ChannelPerformance {
                name: get_string(row, 0)?,
                orders: get_i64(row, 1)?,
                revenue: get_f64(row, 2)?,
                commission: NotComputed,
            })
        })
        .await
}

pub async fn store_performance(
    db: &Database,
    filters: &SalesFilters,
) -> AppResult<Vec<StorePerformance>> {
    let query = with_stores(sales_base_query(filters))
        .select("stores.id")
        .select("stores.name")
        .select("COUNT(DISTINCT sales.id) AS order_count")
        .select("COALESCE(SUM(sales.total_amount), 0) AS revenue")
        .select(
            "CAST(ROUND(COALESCE(AVG(sales.production_seconds + COALESCE(sales.delivery_seconds, 0)), 0) / 60.0) AS INTEGER) AS minutes",
        )
        .group_by("stores.id")
        .group_by("stores.name")
        .order_by("revenue", SortOrder::Desc)
        .order_by("stores.id", SortOrder::Asc);

    query
        .fetch_all(db, |row| {
            Ok(StorePerformance {
                id: get_i64(row, 0)?,
                name: get_string(row, 1)?,
                orders: get_i64(row, 2)?,
                revenue: get_f64(row, 3)?,
                avg_time: get_i64(row, 4)?,
            })
        })
        .await
}

pub async fn payment_methods(
    db: &Database,
    filters: &SalesFilters,
) -> AppResult<Vec<PaymentMethodStats>> {
    let query = sales_base_query(filters)
        .join("payments", "payments.sale_id = sales.id")
        .join("payment_types", "payment_types.id = payments.payment_type_id")
        .select("payment_types.description")
        .select("COUNT(payments.id) AS payment_count")
        .select("COALESCE(SUM(payments.value), 0) AS paid")
        .group_by("payment_types.description")
        .order_by("paid", SortOrder::Desc)
        .order_by("payment_types.description", SortOrder::Asc);

    query
        .fetch_all(db, |row| {
            Ok(PaymentMethodStats {
                method: get_string(row, 0)?,
                count: get_i64(row, 1)?,
                total: get_f64(row, 2)?,
            })
        })
        .await
}

/// Totals across stores. The average time is weighted by each store's
/// order count.
pub fn operational_kpis(stores: &[StorePerformance]) -> OperationalKpis {
    let total_orders: i64 = stores.iter().map(|store| store.orders).sum();
    let total_revenue: f64 = stores.iter().map(|store| store.revenue).sum();

    let avg_time = if total_orders > 0 {
        let weighted: f64 = stores
            .iter()
            .map(|store| store.avg_time as f64 * store.orders as f64)
            .sum();
        (weighted / total_orders as f64).round() as i64
    } else {
        0
    };

    OperationalKpis {
        total_orders,
        total_revenue,
        avg_time,
    }
}

pub async fn operational_data(db: &Database, filters: &SalesFilters) -> AppResult<OperationalData> {
    tracing::debug!(
        "Loading operational data: period={} channel={:?} store={:?}",
        filters.period.as_str(),
        filters.channel,
        filters.store
    );

    let (store_data, channel_data, payment_methods) = tokio::try_join!(
        store_performance(db, filters),
        channel_performance(db, filters),
        payment_methods(db, filters),
    )?;

    Ok(OperationalData {
        kpis: operational_kpis(&store_data),
        store_data,
        channel_data,
        payment_methods,
    })
}
