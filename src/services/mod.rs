pub mod analytics;
pub mod metadata;

pub use analytics::{customers_page, dashboard_data, operational_data, products_page};
pub use metadata::filter_options;
