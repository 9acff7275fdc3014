//! A small `SELECT` builder for the analytics reports.
//!
//! Every step consumes the query and hands it back, so a partially built
//! query can be cloned and extended in different directions (a page query
//! and its count query, for instance) without either affecting the other.
//! Values always travel as bound parameters; only identifiers chosen by the
//! caller end up in the SQL text.

use libsql::{Database, Row, Value};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinKind {
    Inner,
    Left,
}

#[derive(Debug, Clone)]
struct Fragment {
    sql: String,
    params: Vec<Value>,
}

#[derive(Debug, Clone)]
struct Join {
    kind: JoinKind,
    alias: String,
    source: Fragment,
    on: String,
}

#[derive(Debug, Clone)]
pub struct SelectQuery {
    source: Fragment,
    columns: Vec<String>,
    joins: Vec<Join>,
    conditions: Vec<Fragment>,
    group_by: Vec<String>,
    order_by: Vec<String>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl SelectQuery {
    pub fn from(table: &str) -> Self {
        Self::with_source(Fragment {
            sql: table.to_string(),
            params: Vec::new(),
        })
    }

    fn from_subquery(inner: SelectQuery, alias: &str) -> Self {
        Self::with_source(inner.into_fragment(alias))
    }

    fn with_source(source: Fragment) -> Self {
        Self {
            source,
            columns: Vec::new(),
            joins: Vec::new(),
            conditions: Vec::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn select(mut self, column: &str) -> Self {
        self.columns.push(column.to_string());
        self
    }

    pub fn join(self, table: &str, on: &str) -> Self {
        self.push_join(JoinKind::Inner, table, plain(table), on)
    }

    pub fn left_join(self, table: &str, on: &str) -> Self {
        self.push_join(JoinKind::Left, table, plain(table), on)
    }

    pub fn left_join_subquery(self, inner: SelectQuery, alias: &str, on: &str) -> Self {
        let source = inner.into_fragment(alias);
        self.push_join(JoinKind::Left, alias, source, on)
    }

    fn push_join(mut self, kind: JoinKind, alias: &str, source: Fragment, on: &str) -> Self {
        self.joins.push(Join {
            kind,
            alias: alias.to_string(),
            source,
            on: on.to_string(),
        });
        self
    }

    /// Inner join `table` unless an earlier step already joined it.
    pub fn ensure_join(self, table: &str, on: &str) -> Self {
        if self.has_join(table) {
            self
        } else {
            self.join(table, on)
        }
    }

    pub fn has_join(&self, alias: &str) -> bool {
        self.joins.iter().any(|join| join.alias == alias)
    }

    /// Adds a `WHERE` predicate; predicates are combined with `AND`.
    pub fn filter<I>(mut self, predicate: &str, params: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        self.conditions.push(Fragment {
            sql: predicate.to_string(),
            params: params.into_iter().collect(),
        });
        self
    }

    /// `column IN (subquery)`; a containment test that cannot multiply rows.
    pub fn filter_in(mut self, column: &str, inner: SelectQuery) -> Self {
        let (sql, params) = inner.to_sql();
        self.conditions.push(Fragment {
            sql: format!("{column} IN ({sql})"),
            params,
        });
        self
    }

    pub fn group_by(mut self, expr: &str) -> Self {
        self.group_by.push(expr.to_string());
        self
    }

    pub fn order_by(mut self, expr: &str, order: SortOrder) -> Self {
        self.order_by.push(format!("{expr} {}", order.keyword()));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Counts the rows this query would return without its ordering and
    /// pagination. Grouped queries are counted per group.
    pub fn count_query(&self) -> SelectQuery {
        let mut inner = self.clone();
        inner.columns = vec!["1".to_string()];
        inner.order_by.clear();
        inner.limit = None;
        inner.offset = None;

        SelectQuery::from_subquery(inner, "counted").select("COUNT(*)")
    }

    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut params = Vec::new();

        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(", ")
        };
        let mut sql = format!("SELECT {columns} FROM {}", self.source.sql);
        params.extend(self.source.params.iter().cloned());

        for join in &self.joins {
            let keyword = match join.kind {
                JoinKind::Inner => "INNER JOIN",
                JoinKind::Left => "LEFT JOIN",
            };
            sql.push_str(&format!(" {keyword} {} ON {}", join.source.sql, join.on));
            params.extend(join.source.params.iter().cloned());
        }

        if !self.conditions.is_empty() {
            let predicates: Vec<&str> = self.conditions.iter().map(|c| c.sql.as_str()).collect();
            sql.push_str(" WHERE ");
            sql.push_str(&predicates.join(" AND "));
            for condition in &self.conditions {
                params.extend(condition.params.iter().cloned());
            }
        }

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }

        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
            (None, None) => {}
        }

        (sql, params)
    }

    /// Runs the query on a fresh connection and maps every row.
    pub async fn fetch_all<T, F>(&self, db: &Database, map: F) -> AppResult<Vec<T>>
    where
        F: Fn(&Row) -> AppResult<T>,
    {
        let conn = db.connect().map_err(AppError::from)?;
        let (sql, params) = self.to_sql();
        tracing::trace!("analytics query: {}", sql);

        let mut rows = conn.query(&sql, params).await.map_err(AppError::from)?;

        let mut items = Vec::new();
        while let Some(row) = rows.next().await.map_err(AppError::from)? {
            items.push(map(&row)?);
        }
        Ok(items)
    }

    pub async fn fetch_optional<T, F>(&self, db: &Database, map: F) -> AppResult<Option<T>>
    where
        F: Fn(&Row) -> AppResult<T>,
    {
        let conn = db.connect().map_err(AppError::from)?;
        let (sql, params) = self.to_sql();
        tracing::trace!("analytics query: {}", sql);

        let mut rows = conn.query(&sql, params).await.map_err(AppError::from)?;

        match rows.next().await.map_err(AppError::from)? {
            Some(row) => Ok(Some(map(&row)?)),
            None => Ok(None),
        }
    }

    fn into_fragment(self, alias: &str) -> Fragment {
        let (sql, params) = self.to_sql();
        Fragment {
            sql: format!("({sql}) AS {alias}"),
            params,
        }
    }
}

fn plain(table: &str) -> Fragment {
    Fragment {
        sql: table.to_string(),
        params: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_clauses_in_sql_order() {
        let (sql, params) = SelectQuery::from("sales")
            .select("channels.name")
            .select("SUM(sales.total_amount) AS revenue")
            .filter("sales.sale_status_desc = ?", [Value::from("COMPLETED")])
            .join("channels", "channels.id = sales.channel_id")
            .group_by("channels.name")
            .order_by("revenue", SortOrder::Desc)
            .limit(10)
            .to_sql();

        assert_eq!(
            sql,
            "SELECT channels.name, SUM(sales.total_amount) AS revenue FROM sales \
             INNER JOIN channels ON channels.id = sales.channel_id \
             WHERE sales.sale_status_desc = ? GROUP BY channels.name \
             ORDER BY revenue DESC LIMIT 10"
        );
        assert_eq!(params, vec![Value::from("COMPLETED")]);
    }

    #[test]
    fn ensure_join_skips_existing_join() {
        let query = SelectQuery::from("sales")
            .join("channels", "channels.id = sales.channel_id")
            .ensure_join("channels", "channels.id = sales.channel_id")
            .ensure_join("stores", "stores.id = sales.store_id");

        let (sql, _) = query.to_sql();
        assert_eq!(sql.matches("JOIN channels").count(), 1);
        assert_eq!(sql.matches("JOIN stores").count(), 1);
        assert!(query.has_join("channels"));
        assert!(!query.has_join("payments"));
    }

    #[test]
    fn params_follow_join_then_where_order() {
        let stats = SelectQuery::from("sales")
            .select("sales.customer_id")
            .filter("sales.sale_status_desc = ?", [Value::from("COMPLETED")])
            .group_by("sales.customer_id");

        let (sql, params) = SelectQuery::from("customers")
            .filter("customers.email LIKE ?", [Value::from("%a%")])
            .left_join_subquery(stats, "stats", "stats.customer_id = customers.id")
            .to_sql();

        assert!(sql.contains("LEFT JOIN (SELECT sales.customer_id FROM sales WHERE sales.sale_status_desc = ? GROUP BY sales.customer_id) AS stats"));
        assert_eq!(params, vec![Value::from("COMPLETED"), Value::from("%a%")]);
    }

    #[test]
    fn filter_in_inlines_subquery_params() {
        let ids = SelectQuery::from("sales")
            .select("sales.id")
            .filter("sales.store_id = ?", [Value::from(7_i64)]);

        let (sql, params) = SelectQuery::from("product_sales")
            .filter("product_sales.quantity > ?", [Value::from(0_i64)])
            .filter_in("product_sales.sale_id", ids)
            .to_sql();

        assert_eq!(
            sql,
            "SELECT * FROM product_sales WHERE product_sales.quantity > ? AND \
             product_sales.sale_id IN (SELECT sales.id FROM sales WHERE sales.store_id = ?)"
        );
        assert_eq!(params, vec![Value::from(0_i64), Value::from(7_i64)]);
    }

    #[test]
    fn count_query_keeps_predicate_and_drops_paging() {
        let page = SelectQuery::from("products")
            .select("products.name")
            .filter("products.deleted_at IS NULL", [])
            .group_by("products.id")
            .order_by("products.name", SortOrder::Asc)
            .limit(20)
            .offset(40);

        let (sql, _) = page.count_query().to_sql();
        assert_eq!(
            sql,
            "SELECT COUNT(*) FROM (SELECT 1 FROM products WHERE products.deleted_at IS NULL \
             GROUP BY products.id) AS counted"
        );
    }

    #[test]
    fn joins_render_in_insertion_order() {
        let (sql, _) = SelectQuery::from("products")
            .left_join("categories", "categories.id = products.category_id")
            .join("product_sales", "product_sales.product_id = products.id")
            .to_sql();

        assert_eq!(
            sql,
            "SELECT * FROM products \
             LEFT JOIN categories ON categories.id = products.category_id \
             INNER JOIN product_sales ON product_sales.product_id = products.id"
        );
    }

    #[test]
    fn offset_without_limit_is_still_valid_sql() {
        let (sql, _) = SelectQuery::from("stores").offset(5).to_sql();
        assert_eq!(sql, "SELECT * FROM stores LIMIT -1 OFFSET 5");
    }

    #[test]
    fn sort_order_parses_only_known_directions() {
        assert_eq!(SortOrder::parse("asc"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::parse("desc"), Some(SortOrder::Desc));
        assert_eq!(SortOrder::parse("DESC; --"), None);
    }
}
