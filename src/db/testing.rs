//! Temporary databases for tests, shaped like the production sales schema.

use std::sync::Arc;

use chrono::{Days, Local, NaiveDate};
use libsql::{params, Builder, Connection, Database};
use tempfile::TempDir;

const SCHEMA: &str = r#"
CREATE TABLE channels (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
CREATE TABLE stores (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
CREATE TABLE categories (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
CREATE TABLE products (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    category_id INTEGER REFERENCES categories(id),
    deleted_at TEXT
);
CREATE TABLE customers (
    id INTEGER PRIMARY KEY,
    customer_name TEXT,
    email TEXT,
    phone_number TEXT
);
CREATE TABLE sales (
    id INTEGER PRIMARY KEY,
    created_at TEXT NOT NULL,
    total_amount REAL NOT NULL,
    sale_status_desc TEXT NOT NULL,
    channel_id INTEGER REFERENCES channels(id),
    store_id INTEGER REFERENCES stores(id),
    customer_id INTEGER REFERENCES customers(id),
    production_seconds INTEGER,
    delivery_seconds INTEGER
);
CREATE TABLE product_sales (
    id INTEGER PRIMARY KEY,
    sale_id INTEGER NOT NULL REFERENCES sales(id),
    product_id INTEGER NOT NULL REFERENCES products(id),
    base_price REAL NOT NULL,
    total_price REAL NOT NULL,
    quantity INTEGER NOT NULL
);
CREATE TABLE item_product_sales (
    id INTEGER PRIMARY KEY,
    product_sale_id INTEGER NOT NULL REFERENCES product_sales(id)
);
CREATE TABLE payment_types (id INTEGER PRIMARY KEY, description TEXT NOT NULL);
CREATE TABLE payments (
    id INTEGER PRIMARY KEY,
    sale_id INTEGER NOT NULL REFERENCES sales(id),
    payment_type_id INTEGER NOT NULL REFERENCES payment_types(id),
    value REAL NOT NULL
);
"#;

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `YYYY-MM-DD HH:MM:SS` timestamp `days_ago` days before today.
pub fn at(days_ago: u64, hour: u32) -> String {
    let day = today() - Days::new(days_ago);
    format!("{} {:02}:15:00", day.format("%Y-%m-%d"), hour)
}

#[derive(Debug, Clone)]
pub struct SaleSeed {
    pub id: i64,
    pub created_at: String,
    pub total: f64,
    pub status: &'static str,
    pub channel_id: i64,
    pub store_id: i64,
    pub customer_id: Option<i64>,
    pub production_seconds: Option<i64>,
    pub delivery_seconds: Option<i64>,
}

impl SaleSeed {
    pub fn completed(id: i64, created_at: String, total: f64) -> Self {
        Self {
            id,
            created_at,
            total,
            status: "COMPLETED",
            channel_id: 1,
            store_id: 1,
            customer_id: None,
            production_seconds: None,
            delivery_seconds: None,
        }
    }

    pub fn status(mut self, status: &'static str) -> Self {
        self.status = status;
        self
    }

    pub fn channel(mut self, channel_id: i64) -> Self {
        self.channel_id = channel_id;
        self
    }

    pub fn store(mut self, store_id: i64) -> Self {
        self.store_id = store_id;
        self
    }

    pub fn customer(mut self, customer_id: i64) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn timing(mut self, production_seconds: i64, delivery_seconds: Option<i64>) -> Self {
        self.production_seconds = Some(production_seconds);
        self.delivery_seconds = delivery_seconds;
        self
    }
}

pub struct TestDb {
    pub db: Database,
    _dir: TempDir,
}

impl TestDb {
    /// A database file with no tables at all.
    pub async fn empty() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analytics.db");
        let db = Builder::new_local(path).build().await.unwrap();
        Self { db, _dir: dir }
    }

    pub async fn with_schema() -> Self {
        let test_db = Self::empty().await;
        test_db.conn().execute_batch(SCHEMA).await.unwrap();
        test_db
    }

    pub fn conn(&self) -> Connection {
        self.db.connect().unwrap()
    }

    /// Moves the database into shared state. The directory must outlive it.
    pub fn into_shared(self) -> (Arc<Database>, TempDir) {
        (Arc::new(self.db), self._dir)
    }

    pub async fn channel(&self, id: i64, name: &str) {
        self.conn()
            .execute("INSERT INTO channels (id, name) VALUES (?, ?)", params![id, name])
            .await
            .unwrap();
    }

    pub async fn store(&self, id: i64, name: &str) {
        self.conn()
            .execute("INSERT INTO stores (id, name) VALUES (?, ?)", params![id, name])
            .await
            .unwrap();
    }

    pub async fn category(&self, id: i64, name: &str) {
        self.conn()
            .execute("INSERT INTO categories (id, name) VALUES (?, ?)", params![id, name])
            .await
            .unwrap();
    }

    pub async fn product(&self, id: i64, name: &str, category_id: i64) {
        self.conn()
            .execute(
                "INSERT INTO products (id, name, category_id) VALUES (?, ?, ?)",
                params![id, name, category_id],
            )
            .await
            .unwrap();
    }

    pub async fn deleted_product(&self, id: i64, name: &str, category_id: i64) {
        self.conn()
            .execute(
                "INSERT INTO products (id, name, category_id, deleted_at) VALUES (?, ?, ?, '2024-01-01 00:00:00')",
                params![id, name, category_id],
            )
            .await
            .unwrap();
    }

    pub async fn customer(&self, id: i64, name: &str, email: &str) {
        self.conn()
            .execute(
                "INSERT INTO customers (id, customer_name, email, phone_number) VALUES (?, ?, ?, ?)",
                params![id, name, email, format!("+55 11 9000-{id:04}")],
            )
            .await
            .unwrap();
    }

    pub async fn sale(&self, sale: SaleSeed) {
        self.conn()
            .execute(
                "INSERT INTO sales (id, created_at, total_amount, sale_status_desc, channel_id, store_id, customer_id, production_seconds, delivery_seconds)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    sale.id,
                    sale.created_at,
                    sale.total,
                    sale.status,
                    sale.channel_id,
                    sale.store_id,
                    sale.customer_id,
                    sale.production_seconds,
                    sale.delivery_seconds
                ],
            )
            .await
            .unwrap();
    }

    pub async fn product_sale(
        &self,
        id: i64,
        sale_id: i64,
        product_id: i64,
        base_price: f64,
        total_price: f64,
        quantity: i64,
    ) {
        self.conn()
            .execute(
                "INSERT INTO product_sales (id, sale_id, product_id, base_price, total_price, quantity) VALUES (?, ?, ?, ?, ?, ?)",
                params![id, sale_id, product_id, base_price, total_price, quantity],
            )
            .await
            .unwrap();
    }

    pub async fn item_option(&self, id: i64, product_sale_id: i64) {
        self.conn()
            .execute(
                "INSERT INTO item_product_sales (id, product_sale_id) VALUES (?, ?)",
                params![id, product_sale_id],
            )
            .await
            .unwrap();
    }

    pub async fn payment_type(&self, id: i64, description: &str) {
        self.conn()
            .execute(
                "INSERT INTO payment_types (id, description) VALUES (?, ?)",
                params![id, description],
            )
            .await
            .unwrap();
    }

    pub async fn payment(&self, id: i64, sale_id: i64, payment_type_id: i64, value: f64) {
        self.conn()
            .execute(
                "INSERT INTO payments (id, sale_id, payment_type_id, value) VALUES (?, ?, ?, ?)",
                params![id, sale_id, payment_type_id, value],
            )
            .await
            .unwrap();
    }

    /// Two channels, two stores, and a handful of sales over the last week.
    pub async fn restaurant() -> Self {
        let test_db = Self::with_schema().await;

        test_db.channel(1, "Balcão").await;
        test_db.channel(2, "iFood").await;
        test_db.store(1, "Centro").await;
        test_db.store(2, "Savassi").await;

        test_db
            .sale(SaleSeed::completed(1, at(0, 12), 100.0).timing(600, Some(600)))
            .await;
        test_db
            .sale(SaleSeed::completed(2, at(0, 12), 50.0).channel(2).timing(900, Some(300)))
            .await;
        test_db
            .sale(SaleSeed::completed(3, at(1, 19), 80.0).channel(2).store(2).timing(1200, None))
            .await;
        test_db
            .sale(SaleSeed::completed(4, at(2, 20), 40.0).status("CANCELLED"))
            .await;
        // Outside every period but "year"
        test_db
            .sale(SaleSeed::completed(5, at(120, 13), 500.0))
            .await;

        test_db
    }
}
