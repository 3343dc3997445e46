//! Storefront Catalog
//!
//! Product catalog and message-based checkout for a small storefront.
//!
//! ## Features
//! - Product catalog management with image upload
//! - Category filtering and listing
//! - Shopper cart with pluggable local storage
//! - Checkout as a pre-filled messaging-app order
//! - Optional catalog change events over NATS

use thiserror::Error;

pub mod catalog;
pub mod config;
pub mod domain;
pub mod http;
pub mod images;
pub mod publisher;
pub mod store;

pub use catalog::ProductCatalog;
pub use config::Config;
pub use domain::aggregates::{Cart, CartItem, CartSession, Customer, OrderChannel, Product, ProductFields};
pub use domain::value_objects::{to_decimal, to_minor_units, Price, ProductId};

use domain::aggregates::ProductError;
use domain::value_objects::PriceError;
use images::UploadError;
use store::StoreError;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("product {0} not found")]
    NotFound(ProductId),

    #[error("{0}")]
    Validation(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("image upload failed: {0}")]
    Upstream(String),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<ProductError> for CatalogError {
    fn from(e: ProductError) -> Self { Self::Validation(e.to_string()) }
}

impl From<PriceError> for CatalogError {
    fn from(e: PriceError) -> Self { Self::Validation(e.to_string()) }
}

impl From<UploadError> for CatalogError {
    fn from(e: UploadError) -> Self {
        if e.is_client_error() { Self::Validation(e.to_string()) } else { Self::Upstream(e.to_string()) }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
