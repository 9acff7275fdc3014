use libsql::Database;

use crate::db::row::{get_i64, get_string};
use crate::db::{SelectQuery, SortOrder};
use crate::error::AppResult;
use crate::models::{FilterMetadata, FilterOption};

/// One entry per distinct name; duplicates collapse onto their lowest id.
async fn distinct_names(db: &Database, table: &str) -> AppResult<Vec<FilterOption>> {
    let name = format!("{table}.name");

    let query = SelectQuery::from(table)
        .select(&format!("MIN({table}.id)"))
        .select(&name)
        .filter(&format!("{name} IS NOT NULL"), [])
        .group_by(&name)
        .order_by(&name, SortOrder::Asc);

    query
        .fetch_all(db, |row| {
            Ok(FilterOption {
                id: get_i64(row, 0)?,
                name: get_string(row, 1)?,
            })
        })
        .await
}

pub async fn filter_options(db: &Database) -> AppResult<FilterMetadata> {
    let (stores, channels) =
        tokio::try_join!(distinct_names(db, "stores"), distinct_names(db, "channels"))?;

    tracing::debug!(
        "Loaded filter options: {} stores, {} channels",
        stores.len(),
        channels.len()
    );

    Ok(FilterMetadata { stores, channels })
}
