//! Product persistence.
//!
//! One contract, two backings: PostgreSQL for deployments and an in-memory
//! store for tests and local runs. Which one is used is a configuration
//! choice (`CATALOG_BACKEND`).

use async_trait::async_trait;
use crate::domain::aggregates::{Product, ProductDraft};
use crate::domain::value_objects::ProductId;

pub mod memory;
pub mod postgres;

pub use memory::MemoryProductStore;
pub use postgres::PgProductStore;

/// Raw store operations. Not-found is reported as `None`/`false`; the catalog
/// service turns that into an error.
#[async_trait]
pub trait ProductStore: Send + Sync {
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<(), StoreError>;

    /// Newest first; `category` filters by exact match.
    async fn list(&self, category: Option<&str>) -> Result<Vec<Product>, StoreError>;

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Distinct non-null categories, ascending.
    async fn categories(&self) -> Result<Vec<String>, StoreError>;

    async fn insert(&self, draft: ProductDraft) -> Result<Product, StoreError>;

    /// Overwrites every field. `None` when the row is gone.
    async fn update(&self, id: ProductId, draft: ProductDraft) -> Result<Option<Product>, StoreError>;

    /// `false` when nothing was deleted.
    async fn delete(&self, id: ProductId) -> Result<bool, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("stored row {id} is invalid: {reason}")]
    Corrupt { id: ProductId, reason: String },
}
