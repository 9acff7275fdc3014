//! Report queries behind the analytics pages.
//!
//! Each report is one SQL query over the shared sales base; page
//! aggregators run their reports concurrently and fail as a whole.

pub mod base;
pub mod customers;
pub mod dashboard;
pub mod operational;
pub mod products;

pub use customers::customers_page;
pub use dashboard::dashboard_data;
pub use operational::operational_data;
pub use products::products_page;
