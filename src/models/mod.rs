pub mod analytics;
pub mod filters;

pub use analytics::{
    BestDay, ChannelPerformance, ChannelPoint, CustomerKpis, CustomerList, CustomerRow,
    CustomersPage, DashboardData, FilterMetadata, FilterOption, KpiMetrics, NotComputed,
    OperationalData, OperationalKpis, PaymentMethodStats, PeakHour, ProductKpis, ProductList,
    ProductRow, ProductsPage, QuickInsights, SalesPoint, StorePerformance, TopChannel, TopProduct,
};
pub use filters::{
    folded_column, CustomerSort, FilterParams, ListParams, ListQuery, Period, ProductSort,
    SalesFilters, SortKey,
};
