use chrono::NaiveDate;
use libsql::Database;

use crate::db::row::{get_f64, get_i64, get_string};
use crate::db::{SelectQuery, SortOrder};
use crate::error::AppResult;
use crate::models::{
    BestDay, ChannelPoint, DashboardData, KpiMetrics, NotComputed, PeakHour, QuickInsights,
    SalesFilters, SalesPoint, TopChannel, TopProduct,
};
use crate::services::analytics::base::{sales_base_query, with_channels};

const WEEKDAYS: [&str; 7] = [
    "Domingo", "Segunda", "Terça", "Quarta", "Quinta", "Sexta", "Sábado",
];

const TOP_PRODUCTS_LIMIT: u32 = 10;

pub async fn kpi_metrics(db: &Database, filters: &SalesFilters) -> AppResult<KpiMetrics> {
    let query = sales_base_query(filters)
        .select("COALESCE(SUM(sales.total_amount), 0)")
        .select("COUNT(DISTINCT sales.id)")
        .select("COALESCE(AVG(sales.total_amount), 0)")
        .select("COALESCE(AVG(COALESCE(sales.production_seconds, 0) + COALESCE(sales.delivery_seconds, 0)), 0)");

    let kpis = query
        .fetch_optional(db, |row| {
            let average_seconds = get_f64(row, 3)?;
            Ok(KpiMetrics {
                total_revenue: get_f64(row, 0)?,
                total_orders: get_i64(row, 1)?,
                average_ticket: get_f64(row, 2)?,
                average_minutes: (average_seconds / 60.0).round() as i64,
            })
        })
        .await?;

    Ok(kpis.unwrap_or_default())
}

pub async fn sales_chart(db: &Database, filters: &SalesFilters) -> AppResult<Vec<SalesPoint>> {
    let query = sales_base_query(filters)
        .select("date(sales.created_at) AS day")
        .select("COALESCE(SUM(sales.total_amount), 0) AS revenue")
        .select("COUNT(DISTINCT sales.id) AS order_count")
        .group_by("day")
        .order_by("day", SortOrder::Asc);

    query
        .fetch_all(db, |row| {
            Ok(SalesPoint {
                date: short_date(&get_string(row, 0)?),
                sales: get_f64(row, 1)?,
                orders: get_i64(row, 2)?,
            })
        })
        .await
}

/// `2024-03-09` becomes `09/03`; anything unparsable is passed through.
fn short_date(day: &str) -> String {
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map(|date| date.format("%d/%m").to_string())
        .unwrap_or_else(|_| day.to_string())
}

pub async fn channel_chart(db: &Database, filters: &SalesFilters) -> AppResult<Vec<ChannelPoint>> {
    let query = with_channels(sales_base_query(filters))
        .select("channels.name")
        .select("COALESCE(SUM(sales.total_amount), 0) AS revenue")
        .select("COUNT(DISTINCT sales.id) AS order_count")
        .group_by("channels.name")
        .order_by("revenue", SortOrder::Desc)
        .order_by("channels.name", SortOrder::Asc);

    query
        .fetch_all(db, |row| {
            Ok(ChannelPoint {
                channel: get_string(row, 0)?,
                sales: get_f64(row, 1)?,
                orders: get_i64(row, 2)?,
            })
        })
        .await
}

pub async fn top_products(db: &Database, filters: &SalesFilters) -> AppResult<Vec<TopProduct>> {
    let sale_ids = sales_base_query(filters).select("sales.id");

    let query = SelectQuery::from("product_sales")
        .join("sales", "sales.id = product_sales.sale_id")
        .join("products", "products.id = product_sales.product_id")
        .join("categories", "categories.id = products.category_id")
        .filter_in("sales.id", sale_ids)
        .select("products.name")
        .select("categories.name")
        .select("COALESCE(SUM(product_sales.total_price), 0) AS revenue")
        .select("COALESCE(SUM(product_sales.quantity), 0) AS units")
        .group_by("products.name")
        .group_by("categories.name")
        .order_by("revenue", SortOrder::Desc)
        .order_by("products.name", SortOrder::Asc)
        .limit(TOP_PRODUCTS_LIMIT);

    query
        .fetch_all(db, |row| {
            Ok(TopProduct {
                name: get_string(row, 0)?,
                category: get_string(row, 1)?,
                sales: get_f64(row, 2)?,
                quantity: get_i64(row, 3)?,
                change: NotComputed,
            })
        })
        .await
}

async fn peak_hour(db: &Database, filters: &SalesFilters) -> AppResult<PeakHour> {
    let query = sales_base_query(filters)
        .select("CAST(strftime('%H', sales.created_at) AS INTEGER) AS hour")
        .select("COUNT(DISTINCT sales.id) AS order_count")
        .group_by("hour")
        .order_by("order_count", SortOrder::Desc)
        .order_by("hour", SortOrder::Asc)
        .limit(1);

    let peak = query
        .fetch_optional(db, |row| {
            Ok(PeakHour {
                hour: get_i64(row, 0)?.clamp(0, 23) as u32,
                orders: get_i64(row, 1)?,
            })
        })
        .await?;

    Ok(peak.unwrap_or_default())
}

async fn best_day(db: &Database, filters: &SalesFilters) -> AppResult<BestDay> {
    // strftime('%w'): 0 is Sunday
    let query = sales_base_query(filters)
        .select("CAST(strftime('%w', sales.created_at) AS INTEGER) AS weekday")
        .select("COALESCE(SUM(sales.total_amount), 0) AS revenue")
        .select("COUNT(DISTINCT sales.id) AS order_count")
        .group_by("weekday")
        .order_by("revenue", SortOrder::Desc)
        .order_by("weekday", SortOrder::Asc)
        .limit(1);

    let day = query
        .fetch_optional(db, |row| {
            let weekday = get_i64(row, 0)?;
            Ok(BestDay {
                name: usize::try_from(weekday)
                    .ok()
                    .and_then(|idx| WEEKDAYS.get(idx))
                    .map(|name| name.to_string())
                    .unwrap_or_else(|| "N/A".to_string()),
                sales: get_f64(row, 1)?,
                orders: get_i64(row, 2)?,
            })
        })
        .await?;

    Ok(day.unwrap_or_default())
}

pub async fn quick_insights(db: &Database, filters: &SalesFilters) -> AppResult<QuickInsights> {
    let (peak_hour, best_day, channels) = tokio::try_join!(
        peak_hour(db, filters),
        best_day(db, filters),
        channel_chart(db, filters),
    )?;

    let top_channel = channels
        .into_iter()
        .next()
        .map(|point| TopChannel {
            name: point.channel,
            sales: point.sales,
        })
        .unwrap_or_default();

    Ok(QuickInsights {
        peak_hour,
        best_day,
        top_channel,
    })
}

pub async fn dashboard_data(db: &Database, filters: &SalesFilters) -> AppResult<DashboardData> {
    tracing::debug!(
        "Loading dashboard: period={} channel={:?} store={:?}",
        filters.period.as_str(),
        filters.channel,
        filters.store
    );

    let (kpis, sales_chart, channel_chart, top_products, quick_insights) = tokio::try_join!(
        kpi_metrics(db, filters),
        sales_chart(db, filters),
        channel_chart(db, filters),
        top_products(db, filters),
        quick_insights(db, filters),
    )?;

    Ok(DashboardData {
        kpis,
        sales_chart,
        channel_chart,
        top_products,
        quick_insights,
    })
}
