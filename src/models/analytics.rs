use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

/// A metric the dashboard shows but nothing computes yet (period-over-period
/// change, channel commission). Serialized as `0` so clients keep a number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotComputed;

impl Serialize for NotComputed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(0)
    }
}

// Dashboard

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KpiMetrics {
    #[serde(rename = "faturamentoTotal")]
    pub total_revenue: f64,
    #[serde(rename = "totalPedidos")]
    pub total_orders: i64,
    #[serde(rename = "ticketMedio")]
    pub average_ticket: f64,
    /// Production plus delivery time, whole minutes.
    #[serde(rename = "tempoMedio")]
    pub average_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesPoint {
    pub date: String,
    pub sales: f64,
    pub orders: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelPoint {
    pub channel: String,
    pub sales: f64,
    pub orders: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopProduct {
    pub name: String,
    pub category: String,
    pub sales: f64,
    pub quantity: i64,
    pub change: NotComputed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeakHour {
    pub hour: u32,
    pub orders: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BestDay {
    pub name: String,
    pub sales: f64,
    pub orders: i64,
}

impl Default for BestDay {
    fn default() -> Self {
        Self {
            name: "N/A".to_string(),
            sales: 0.0,
            orders: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopChannel {
    pub name: String,
    pub sales: f64,
}

impl Default for TopChannel {
    fn default() -> Self {
        Self {
            name: "N/A".to_string(),
            sales: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuickInsights {
    #[serde(rename = "horarioPico")]
    pub peak_hour: PeakHour,
    #[serde(rename = "melhorDia")]
    pub best_day: BestDay,
    #[serde(rename = "canalDestaque")]
    pub top_channel: TopChannel,
}

impl Serialize for PeakHour {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PeakHour", 2)?;
        state.serialize_field("hora", &format!("{}h - {}h", self.hour, self.hour + 1))?;
        state.serialize_field("pedidos", &format!("{} pedidos", self.orders))?;
        state.end()
    }
}

impl Serialize for BestDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BestDay", 3)?;
        state.serialize_field("dia", &self.name)?;
        state.serialize_field("vendas", &format_brl(self.sales))?;
        state.serialize_field("pedidos", &format!("{} pedidos", self.orders))?;
        state.end()
    }
}

impl Serialize for TopChannel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("TopChannel", 2)?;
        state.serialize_field("canal", &self.name)?;
        state.serialize_field("vendas", &format_brl(self.sales))?;
        state.end()
    }
}

/// Formats an amount in Brazilian reais the way pt-BR number formatting
/// does: thousands grouped with `.`, up to three decimals after `,` and
/// trailing zeros dropped (`R$ 130`, `R$ 1.234,5`).
pub fn format_brl(value: f64) -> String {
    let millis = (value * 1000.0).round() as i64;
    let sign = if millis < 0 { "-" } else { "" };
    let millis = millis.unsigned_abs();

    let digits = (millis / 1000).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let fraction = format!("{:03}", millis % 1000);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("R$ {sign}{grouped}")
    } else {
        format!("R$ {sign}{grouped},{fraction}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub kpis: KpiMetrics,
    pub sales_chart: Vec<SalesPoint>,
    pub channel_chart: Vec<ChannelPoint>,
    pub top_products: Vec<TopProduct>,
    pub quick_insights: QuickInsights,
}

// Products page

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductKpis {
    pub total_products: i64,
    pub total_revenue: f64,
    pub avg_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    /// Average base price, add-ons excluded.
    pub price: f64,
    pub sales: f64,
    pub quantity: i64,
    pub options_count: i64,
    pub change: NotComputed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductList {
    pub products: Vec<ProductRow>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsPage {
    #[serde(flatten)]
    pub kpis: ProductKpis,
    pub products: Vec<ProductRow>,
    pub page: u32,
    pub total_pages: u64,
    pub total_found: u64,
}

// Customers page

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerKpis {
    pub total_customers: i64,
    pub total_revenue: f64,
    pub avg_overall_ticket: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRow {
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub order_count: i64,
    pub total_spent: f64,
    pub avg_ticket: f64,
    pub last_order: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerList {
    pub customers: Vec<CustomerRow>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomersPage {
    #[serde(flatten)]
    pub kpis: CustomerKpis,
    pub customers: Vec<CustomerRow>,
    pub page: u32,
    pub total_pages: u64,
}

// Operational page

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelPerformance {
    pub name: String,
    pub orders: i64,
    pub revenue: f64,
    pub commission: NotComputed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorePerformance {
    pub id: i64,
    pub name: String,
    pub orders: i64,
    pub revenue: f64,
    pub avg_time: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentMethodStats {
    pub method: String,
    pub count: i64,
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationalKpis {
    pub total_orders: i64,
    pub total_revenue: f64,
    pub avg_time: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationalData {
    pub kpis: OperationalKpis,
    pub store_data: Vec<StorePerformance>,
    pub channel_data: Vec<ChannelPerformance>,
    pub payment_methods: Vec<PaymentMethodStats>,
}

// Metadata

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOption {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterMetadata {
    pub stores: Vec<FilterOption>,
    pub channels: Vec<FilterOption>,
}
