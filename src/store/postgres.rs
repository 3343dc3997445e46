//! PostgreSQL backing via sqlx.

use std::time::Duration;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::instrument;
use crate::domain::aggregates::{Product, ProductDraft};
use crate::domain::value_objects::{Price, ProductId};
use super::{ProductStore, StoreError};

const COLUMNS: &str = "id, name, description, price, image_url, category, created_at";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: Option<String>,
    price: i64,
    image_url: Option<String>,
    category: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;
    fn try_from(r: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::from_cents(r.price).map_err(|e| StoreError::Corrupt { id: r.id, reason: e.to_string() })?;
        Ok(Product {
            id: r.id, name: r.name, description: r.description, price,
            image_url: r.image_url, category: r.category, created_at: r.created_at,
        })
    }
}

#[derive(Clone)]
pub struct PgProductStore { pool: PgPool }

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    pub async fn connect(database_url: &SecretString, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url.expose_secret())
            .await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    fn backend(&self) -> &'static str { "postgres" }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self, category: Option<&str>) -> Result<Vec<Product>, StoreError> {
        let rows = match category {
            Some(c) => sqlx::query_as::<_, ProductRow>(&format!("SELECT {COLUMNS} FROM products WHERE category = $1 ORDER BY created_at DESC, id DESC"))
                .bind(c).fetch_all(&self.pool).await?,
            None => sqlx::query_as::<_, ProductRow>(&format!("SELECT {COLUMNS} FROM products ORDER BY created_at DESC, id DESC"))
                .fetch_all(&self.pool).await?,
        };
        rows.into_iter().map(Product::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        sqlx::query_as::<_, ProductRow>(&format!("SELECT {COLUMNS} FROM products WHERE id = $1"))
            .bind(id).fetch_optional(&self.pool).await?
            .map(Product::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn categories(&self) -> Result<Vec<String>, StoreError> {
        let cats = sqlx::query_scalar::<_, String>("SELECT DISTINCT category FROM products WHERE category IS NOT NULL ORDER BY category")
            .fetch_all(&self.pool).await?;
        Ok(cats)
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    async fn insert(&self, draft: ProductDraft) -> Result<Product, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("INSERT INTO products (name, description, price, image_url, category) VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"))
            .bind(&draft.name).bind(&draft.description).bind(draft.price.cents()).bind(&draft.image_url).bind(&draft.category)
            .fetch_one(&self.pool).await?;
        Product::try_from(row)
    }

    #[instrument(skip(self, draft))]
    async fn update(&self, id: ProductId, draft: ProductDraft) -> Result<Option<Product>, StoreError> {
        sqlx::query_as::<_, ProductRow>(&format!("UPDATE products SET name = $2, description = $3, price = $4, image_url = $5, category = $6 WHERE id = $1 RETURNING {COLUMNS}"))
            .bind(id).bind(&draft.name).bind(&draft.description).bind(draft.price.cents()).bind(&draft.image_url).bind(&draft.category)
            .fetch_optional(&self.pool).await?
            .map(Product::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        let done = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(done.rows_affected() > 0)
    }
}
