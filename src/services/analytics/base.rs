use libsql::Value;

use crate::db::SelectQuery;
use crate::models::SalesFilters;

/// The only sale status that counts towards revenue and order metrics.
pub const COMPLETED_STATUS: &str = "COMPLETED";

const CHANNELS_ON: &str = "channels.id = sales.channel_id";
const STORES_ON: &str = "stores.id = sales.store_id";

pub fn completed() -> Value {
    Value::from(COMPLETED_STATUS)
}

/// Completed sales inside the period, narrowed to the selected channel and
/// store. Channel and store tables are joined only when a filter needs them.
pub fn sales_base_query(filters: &SalesFilters) -> SelectQuery {
    let query = SelectQuery::from("sales")
        .filter(
            "datetime(sales.created_at) BETWEEN ? AND ?",
            [
                Value::from(filters.range.start_bound()),
                Value::from(filters.range.end_bound()),
            ],
        )
        .filter("sales.sale_status_desc = ?", [completed()]);

    let query = match &filters.channel {
        Some(channel) => query
            .join("channels", CHANNELS_ON)
            .filter("channels.name = ?", [Value::from(channel.clone())]),
        None => query,
    };

    match &filters.store {
        Some(store) => query
            .join("stores", STORES_ON)
            .filter("stores.name = ?", [Value::from(store.clone())]),
        None => query,
    }
}

pub fn with_channels(query: SelectQuery) -> SelectQuery {
    query.ensure_join("channels", CHANNELS_ON)
}

pub fn with_stores(query: SelectQuery) -> SelectQuery {
    query.ensure_join("stores", STORES_ON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FilterParams;
    use chrono::NaiveDate;

    fn filters(channel: Option<&str>, store: Option<&str>) -> SalesFilters {
        SalesFilters::normalize(
            FilterParams {
                period: Some("30days".into()),
                channel: channel.map(String::from),
                store: store.map(String::from),
            },
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        )
    }

    #[test]
    fn unfiltered_query_has_no_joins() {
        let (sql, params) = sales_base_query(&filters(None, None)).to_sql();
        assert_eq!(
            sql,
            "SELECT * FROM sales WHERE datetime(sales.created_at) BETWEEN ? AND ? \
             AND sales.sale_status_desc = ?"
        );
        assert_eq!(
            params,
            vec![
                Value::from("2024-02-15 00:00:00"),
                Value::from("2024-03-15 23:59:59"),
                Value::from(COMPLETED_STATUS),
            ]
        );
    }

    #[test]
    fn channel_and_store_filters_join_by_name() {
        let (sql, params) = sales_base_query(&filters(Some("iFood"), Some("Centro"))).to_sql();
        assert!(sql.contains("INNER JOIN channels ON channels.id = sales.channel_id"));
        assert!(sql.contains("INNER JOIN stores ON stores.id = sales.store_id"));
        assert!(sql.ends_with("AND channels.name = ? AND stores.name = ?"));
        assert_eq!(params[3], Value::from("iFood"));
        assert_eq!(params[4], Value::from("Centro"));
    }

    #[test]
    fn all_selection_builds_the_same_query_as_no_selection() {
        let all = sales_base_query(&filters(Some("all"), Some("all"))).to_sql();
        let none = sales_base_query(&filters(None, None)).to_sql();
        assert_eq!(all, none);
    }

    #[test]
    fn grouping_joins_are_not_duplicated() {
        let query = with_stores(with_channels(sales_base_query(&filters(
            Some("iFood"),
            Some("Centro"),
        ))));
        let (sql, _) = query.to_sql();
        assert_eq!(sql.matches("JOIN channels").count(), 1);
        assert_eq!(sql.matches("JOIN stores").count(), 1);

        let (sql, _) = with_channels(sales_base_query(&filters(None, None))).to_sql();
        assert_eq!(sql.matches("JOIN channels").count(), 1);
    }
}
