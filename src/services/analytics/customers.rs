use libsql::{Database, Value};

use crate::db::row::{get_f64, get_i64, get_opt_string};
use crate::db::{SelectQuery, SortOrder};
use crate::error::AppResult;
use crate::models::{
    folded_column, CustomerKpis, CustomerList, CustomerRow, CustomerSort, CustomersPage,
    ListParams, SortKey,
};
use crate::services::analytics::base::completed;

pub async fn customer_kpis(db: &Database) -> AppResult<CustomerKpis> {
    let customers = SelectQuery::from("customers").select("COUNT(customers.id)");

    let registered_sales = SelectQuery::from("sales")
        .filter("sales.sale_status_desc = ?", [completed()])
        .filter("sales.customer_id IS NOT NULL", [])
        .select("COALESCE(SUM(sales.total_amount), 0)")
        .select("COUNT(sales.id)");

    let (total_customers, totals) = tokio::try_join!(
        customers.fetch_optional(db, |row| get_i64(row, 0)),
        registered_sales.fetch_optional(db, |row| Ok((get_f64(row, 0)?, get_i64(row, 1)?))),
    )?;

    let (total_revenue, total_orders) = totals.unwrap_or((0.0, 0));
    let avg_overall_ticket = if total_orders > 0 {
        total_revenue / total_orders as f64
    } else {
        0.0
    };

    Ok(CustomerKpis {
        total_customers: total_customers.unwrap_or(0),
        total_revenue,
        avg_overall_ticket,
    })
}

/// Completed-sale aggregates per customer, joined onto the customer list.
fn sales_stats() -> SelectQuery {
    SelectQuery::from("sales")
        .select("sales.customer_id")
        .select("SUM(sales.total_amount) AS spent")
        .select("COUNT(sales.id) AS orders")
        .select("AVG(sales.total_amount) AS ticket")
        .select("MAX(sales.created_at) AS last_order_at")
        .filter("sales.sale_status_desc = ?", [completed()])
        .filter("sales.customer_id IS NOT NULL", [])
        .group_by("sales.customer_id")
}

fn customers_query(params: &ListParams<CustomerSort>) -> SelectQuery {
    let query = SelectQuery::from("customers");

    match params.search_pattern() {
        Some(pattern) => query.filter(
            &format!(
                "({} LIKE ? ESCAPE '\\' OR {} LIKE ? ESCAPE '\\')",
                folded_column("customers.customer_name"),
                folded_column("customers.email"),
            ),
            [Value::from(pattern.clone()), Value::from(pattern)],
        ),
        None => query,
    }
}

pub async fn customers_list(
    db: &Database,
    params: &ListParams<CustomerSort>,
) -> AppResult<CustomerList> {
    let query = customers_query(params);
    // The count only depends on the customer predicate, not on sales.
    let count = query.clone().select("COUNT(customers.id)");

    let page = query
        .left_join_subquery(sales_stats(), "sales_stats", "sales_stats.customer_id = customers.id")
        .select("customers.id")
        .select("customers.customer_name")
        .select("customers.email")
        .select("customers.phone_number")
        .select("COALESCE(sales_stats.orders, 0) AS order_count")
        .select("COALESCE(sales_stats.spent, 0) AS total_spent")
        .select("COALESCE(sales_stats.ticket, 0) AS avg_ticket")
        .select("sales_stats.last_order_at")
        .order_by(params.sort_by.column(), params.sort_order)
        .order_by("customers.id", SortOrder::Asc)
        .limit(params.limit)
        .offset(params.offset());

    let (customers, total) = tokio::try_join!(
        page.fetch_all(db, |row| {
            Ok(CustomerRow {
                id: get_i64(row, 0)?,
                name: get_opt_string(row, 1)?,
                email: get_opt_string(row, 2)?,
                phone: get_opt_string(row, 3)?,
                order_count: get_i64(row, 4)?,
                total_spent: get_f64(row, 5)?,
                avg_ticket: get_f64(row, 6)?,
                last_order: get_opt_string(row, 7)?,
            })
        }),
        count.fetch_optional(db, |row| get_i64(row, 0)),
    )?;

    Ok(CustomerList {
        customers,
        total: total.unwrap_or(0).max(0) as u64,
    })
}

pub async fn customers_page(
    db: &Database,
    params: &ListParams<CustomerSort>,
) -> AppResult<CustomersPage> {
    tracing::debug!(
        "Loading customers page: search={:?} page={} sort={:?} {:?}",
        params.search_term,
        params.page,
        params.sort_by,
        params.sort_order
    );

    let (kpis, list) = tokio::try_join!(customer_kpis(db), customers_list(db, params))?;

    Ok(CustomersPage {
        kpis,
        customers: list.customers,
        page: params.page,
        total_pages: params.total_pages(list.total),
    })
}
