use libsql::{Database, Value};

use crate::db::row::{get_f64, get_i64, get_opt_string, get_string};
use crate::db::{SelectQuery, SortOrder};
use crate::error::AppResult;
use crate::models::{
    folded_column, ListParams, NotComputed, ProductKpis, ProductList, ProductRow, ProductSort,
    ProductsPage, SortKey,
};
use crate::services::analytics::base::completed;

/// Catalogue-wide totals. Not affected by search or pagination.
pub async fn product_kpis(db: &Database) -> AppResult<ProductKpis> {
    let products = SelectQuery::from("products")
        .filter("products.deleted_at IS NULL", [])
        .select("COUNT(DISTINCT products.id)");

    let line_totals = SelectQuery::from("product_sales")
        .join("sales", "sales.id = product_sales.sale_id")
        .filter("sales.sale_status_desc = ?", [completed()])
        .select("COALESCE(SUM(product_sales.total_price), 0)")
        .select("COALESCE(SUM(product_sales.quantity), 0)");

    let (total_products, totals) = tokio::try_join!(
        products.fetch_optional(db, |row| get_i64(row, 0)),
        line_totals.fetch_optional(db, |row| Ok((get_f64(row, 0)?, get_i64(row, 1)?))),
    )?;

    let (total_revenue, total_quantity) = totals.unwrap_or((0.0, 0));
    let avg_price = if total_quantity > 0 {
        total_revenue / total_quantity as f64
    } else {
        0.0
    };

    Ok(ProductKpis {
        total_products: total_products.unwrap_or(0),
        total_revenue,
        avg_price,
    })
}

/// Per product-sale option counts, so options don't multiply line totals.
fn item_options() -> SelectQuery {
    SelectQuery::from("item_product_sales")
        .select("item_product_sales.product_sale_id")
        .select("COUNT(*) AS option_count")
        .group_by("item_product_sales.product_sale_id")
}

/// Line items of completed sales only. Left joined, so a product whose
/// lines all belong to other statuses keeps its row with zero totals.
fn completed_lines() -> SelectQuery {
    SelectQuery::from("product_sales")
        .join("sales", "sales.id = product_sales.sale_id")
        .select("product_sales.id")
        .select("product_sales.product_id")
        .select("product_sales.base_price")
        .select("product_sales.total_price")
        .select("product_sales.quantity")
        .filter("sales.sale_status_desc = ?", [completed()])
}

fn products_query(params: &ListParams<ProductSort>) -> SelectQuery {
    let query = SelectQuery::from("products")
        .left_join("categories", "categories.id = products.category_id")
        .left_join_subquery(
            completed_lines(),
            "completed_lines",
            "completed_lines.product_id = products.id",
        )
        .left_join_subquery(
            item_options(),
            "item_options",
            "item_options.product_sale_id = completed_lines.id",
        )
        .filter("products.deleted_at IS NULL", [])
        .group_by("products.id");

    match params.search_pattern() {
        Some(pattern) => query.filter(
            &format!(
                "({} LIKE ? ESCAPE '\\' OR {} LIKE ? ESCAPE '\\')",
                folded_column("products.name"),
                folded_column("categories.name"),
            ),
            [Value::from(pattern.clone()), Value::from(pattern)],
        ),
        None => query,
    }
}

pub async fn products_list(
    db: &Database,
    params: &ListParams<ProductSort>,
) -> AppResult<ProductList> {
    let query = products_query(params);
    let count = query.count_query();

    let page = query
        .select("products.id")
        .select("products.name")
        .select("categories.name")
        .select("COALESCE(AVG(completed_lines.base_price), 0) AS avg_price")
        .select("COALESCE(SUM(completed_lines.total_price), 0) AS revenue")
        .select("COALESCE(SUM(completed_lines.quantity), 0) AS units")
        .select("COALESCE(SUM(item_options.option_count), 0) AS options")
        .order_by(params.sort_by.column(), params.sort_order)
        .order_by("products.id", SortOrder::Asc)
        .limit(params.limit)
        .offset(params.offset());

    let (products, total) = tokio::try_join!(
        page.fetch_all(db, |row| {
            Ok(ProductRow {
                id: get_i64(row, 0)?,
                name: get_string(row, 1)?,
                category: get_opt_string(row, 2)?,
                price: get_f64(row, 3)?,
                sales: get_f64(row, 4)?,
                quantity: get_i64(row, 5)?,
                options_count: get_i64(row, 6)?,
                change: NotComputed,
            })
        }),
        count.fetch_optional(db, |row| get_i64(row, 0)),
    )?;

    Ok(ProductList {
        products,
        total: total.unwrap_or(0).max(0) as u64,
    })
}

pub async fn products_page(
    db: &Database,
    params: &ListParams<ProductSort>,
) -> AppResult<ProductsPage> {
    tracing::debug!(
        "Loading products page: search={:?} page={} sort={:?} {:?}",
        params.search_term,
        params.page,
        params.sort_by,
        params.sort_order
    );

    let (kpis, list) = tokio::try_join!(product_kpis(db), products_list(db, params))?;

    Ok(ProductsPage {
        kpis,
        products: list.products,
        page: params.page,
        total_pages: params.total_pages(list.total),
        total_found: list.total,
    })
}
