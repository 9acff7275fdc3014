use chrono::{Days, Months, NaiveDate};
use serde::Deserialize;

use crate::config::DEFAULT_PAGE_SIZE;
use crate::db::query::SortOrder;

const MAX_PAGE_SIZE: u32 = 100;

/// Accented capitals folded on both sides of a search. SQLite's `LOWER`
/// only knows ASCII, so anything folded here must also be folded in SQL.
const ACCENTED_CAPITALS: [(char, char); 24] = [
    ('Á', 'á'),
    ('À', 'à'),
    ('Â', 'â'),
    ('Ã', 'ã'),
    ('Ä', 'ä'),
    ('É', 'é'),
    ('È', 'è'),
    ('Ê', 'ê'),
    ('Ë', 'ë'),
    ('Í', 'í'),
    ('Ì', 'ì'),
    ('Î', 'î'),
    ('Ï', 'ï'),
    ('Ó', 'ó'),
    ('Ò', 'ò'),
    ('Ô', 'ô'),
    ('Õ', 'õ'),
    ('Ö', 'ö'),
    ('Ú', 'ú'),
    ('Ù', 'ù'),
    ('Û', 'û'),
    ('Ü', 'ü'),
    ('Ç', 'ç'),
    ('Ñ', 'ñ'),
];

fn fold_char(ch: char) -> char {
    if ch.is_ascii() {
        return ch.to_ascii_lowercase();
    }
    ACCENTED_CAPITALS
        .iter()
        .find(|(upper, _)| *upper == ch)
        .map_or(ch, |(_, lower)| *lower)
}

/// SQL expression folding `column` the same way search terms are folded.
pub fn folded_column(column: &str) -> String {
    let replaced = ACCENTED_CAPITALS
        .iter()
        .fold(column.to_string(), |expr, (upper, lower)| {
            format!("REPLACE({expr}, '{upper}', '{lower}')")
        });
    format!("LOWER({replaced})")
}

/// Relative reporting window. Unknown codes fall back to the last seven days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    SevenDays,
    ThirtyDays,
    NinetyDays,
    Year,
}

impl Period {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("7days") => Period::SevenDays,
            Some("30days") => Period::ThirtyDays,
            Some("90days") => Period::NinetyDays,
            Some("year") => Period::Year,
            _ => Period::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::SevenDays => "7days",
            Period::ThirtyDays => "30days",
            Period::NinetyDays => "90days",
            Period::Year => "year",
        }
    }

    /// First day of the window. Today counts as one of the days.
    pub fn start_date(&self, today: NaiveDate) -> NaiveDate {
        match self {
            Period::SevenDays => today - Days::new(6),
            Period::ThirtyDays => today - Days::new(29),
            Period::NinetyDays => today - Days::new(89),
            Period::Year => today - Months::new(12),
        }
    }

    pub fn date_range(&self, today: NaiveDate) -> DateRange {
        DateRange {
            start: self.start_date(today),
            end: today,
        }
    }
}

/// Inclusive range of calendar days, rendered as SQLite timestamp bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn start_bound(&self) -> String {
        format!("{} 00:00:00", self.start.format("%Y-%m-%d"))
    }

    pub fn end_bound(&self) -> String {
        format!("{} 23:59:59", self.end.format("%Y-%m-%d"))
    }
}

/// Raw `{period, channel, store}` body as sent by the dashboard and operational pages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterParams {
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub store: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesFilters {
    pub period: Period,
    pub range: DateRange,
    pub channel: Option<String>,
    pub store: Option<String>,
}

impl SalesFilters {
    pub fn normalize(params: FilterParams, today: NaiveDate) -> Self {
        let period = Period::parse(params.period.as_deref());

        Self {
            period,
            range: period.date_range(today),
            channel: selection(params.channel),
            store: selection(params.store),
        }
    }
}

/// `"all"`, blank and missing selections all mean "no filter".
fn selection(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty() && value != "all")
}

/// A client-facing sort key mapped onto a trusted column alias.
pub trait SortKey: Copy {
    const DEFAULT: Self;

    fn parse(raw: &str) -> Option<Self>;

    fn column(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSort {
    Price,
    Sales,
    Quantity,
}

impl SortKey for ProductSort {
    const DEFAULT: Self = ProductSort::Sales;

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "price" => Some(ProductSort::Price),
            "sales" => Some(ProductSort::Sales),
            "quantity" => Some(ProductSort::Quantity),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            ProductSort::Price => "avg_price",
            ProductSort::Sales => "revenue",
            ProductSort::Quantity => "units",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerSort {
    OrderCount,
    TotalSpent,
    AvgTicket,
}

impl SortKey for CustomerSort {
    const DEFAULT: Self = CustomerSort::OrderCount;

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "orderCount" => Some(CustomerSort::OrderCount),
            "totalSpent" => Some(CustomerSort::TotalSpent),
            "avgTicket" => Some(CustomerSort::AvgTicket),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            CustomerSort::OrderCount => "order_count",
            CustomerSort::TotalSpent => "total_spent",
            CustomerSort::AvgTicket => "avg_ticket",
        }
    }
}

/// Raw query string of the paginated list pages. Everything stays a string
/// until normalized so that bad input degrades instead of being rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub search_term: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams<S> {
    pub search_term: String,
    pub page: u32,
    pub limit: u32,
    pub sort_by: S,
    pub sort_order: SortOrder,
}

impl<S: SortKey> ListParams<S> {
    pub fn normalize(query: ListQuery, default_limit: u32) -> Self {
        let default_limit = if (1..=MAX_PAGE_SIZE).contains(&default_limit) {
            default_limit
        } else {
            DEFAULT_PAGE_SIZE
        };

        Self {
            search_term: query
                .search_term
                .map(|term| term.trim().to_string())
                .unwrap_or_default(),
            page: query
                .page
                .and_then(|p| p.trim().parse::<u32>().ok())
                .filter(|p| *p >= 1)
                .unwrap_or(1),
            limit: query
                .limit
                .and_then(|l| l.trim().parse::<u32>().ok())
                .filter(|l| (1..=MAX_PAGE_SIZE).contains(l))
                .unwrap_or(default_limit),
            sort_by: query
                .sort_by
                .as_deref()
                .and_then(S::parse)
                .unwrap_or(S::DEFAULT),
            sort_order: query
                .sort_order
                .as_deref()
                .and_then(SortOrder::parse)
                .unwrap_or(SortOrder::Desc),
        }
    }

    pub fn offset(&self) -> u32 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.limit))
    }

    /// Case-folded `LIKE` pattern for the search term, with wildcards
    /// escaped. Compare it against [`folded_column`].
    pub fn search_pattern(&self) -> Option<String> {
        if self.search_term.is_empty() {
            return None;
        }

        let mut pattern = String::with_capacity(self.search_term.len() + 2);
        pattern.push('%');
        for ch in self.search_term.chars().map(fold_char) {
            if matches!(ch, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(ch);
        }
        pattern.push('%');
        Some(pattern)
    }
}
