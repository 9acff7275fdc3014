pub mod pool;
pub mod query;
pub mod row;

#[cfg(test)]
pub mod testing;

pub use pool::{create_database, ping};
pub use query::{SelectQuery, SortOrder};
