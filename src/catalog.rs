//! Catalog service: the product operations exposed to shoppers and admins.
//!
//! Writes that carry an image upload first; the store is only touched once
//! the image host has returned a URL.

use std::sync::Arc;
use tracing::{info, instrument, warn};
use crate::domain::aggregates::{Product, ProductFields};
use crate::domain::events::CatalogEvent;
use crate::domain::value_objects::ProductId;
use crate::images::{ImageUpload, ImageUploader};
use crate::publisher::EventPublisher;
use crate::store::ProductStore;
use crate::{CatalogError, Result};

#[derive(Clone)]
pub struct ProductCatalog {
    store: Arc<dyn ProductStore>,
    images: Arc<dyn ImageUploader>,
    events: EventPublisher,
    max_image_bytes: usize,
}

impl ProductCatalog {
    pub fn new(store: Arc<dyn ProductStore>, images: Arc<dyn ImageUploader>, events: EventPublisher, max_image_bytes: usize) -> Self {
        Self { store, images, events, max_image_bytes }
    }

    pub fn backend(&self) -> &'static str { self.store.backend() }

    pub async fn health(&self) -> Result<()> { Ok(self.store.ping().await?) }

    /// Newest first. A blank category means no filter.
    pub async fn list(&self, category: Option<&str>) -> Result<Vec<Product>> {
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        Ok(self.store.list(category).await?)
    }

    pub async fn get(&self, id: ProductId) -> Result<Product> {
        self.store.get(id).await?.ok_or(CatalogError::NotFound(id))
    }

    pub async fn categories(&self) -> Result<Vec<String>> { Ok(self.store.categories().await?) }

    #[instrument(skip(self, input, image), fields(name = %input.name, with_image = image.is_some()))]
    pub async fn create(&self, input: ProductFields, image: Option<ImageUpload>) -> Result<Product> {
        let draft = input.into_draft()?;
        let image_url = match image {
            Some(image) => Some(self.upload(image).await?),
            None => None,
        };
        let product = self.store.insert(draft.with_image_url(image_url)).await?;
        info!(product_id = product.id, "product created");
        self.events.publish(&CatalogEvent::created(&product)).await;
        Ok(product)
    }

    /// Replaces every field from `input`; the image URL only changes when a new image is sent.
    #[instrument(skip(self, input, image), fields(with_image = image.is_some()))]
    pub async fn update(&self, id: ProductId, input: ProductFields, image: Option<ImageUpload>) -> Result<Product> {
        let draft = input.into_draft()?;
        let current = self.get(id).await?;
        let image_url = match image {
            Some(image) => Some(self.upload(image).await?),
            None => current.image_url,
        };
        let product = self.store.update(id, draft.with_image_url(image_url)).await?
            .ok_or(CatalogError::NotFound(id))?;
        info!(product_id = id, "product updated");
        self.events.publish(&CatalogEvent::updated(&product)).await;
        Ok(product)
    }

    /// Returns the product as it was before deletion.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<Product> {
        let current = self.get(id).await?;
        if !self.store.delete(id).await? {
            warn!(product_id = id, "product vanished before delete");
            return Err(CatalogError::NotFound(id));
        }
        info!(product_id = id, "product deleted");
        self.events.publish(&CatalogEvent::deleted(&current)).await;
        Ok(current)
    }

    async fn upload(&self, image: ImageUpload) -> Result<String> {
        image.validate(self.max_image_bytes)?;
        match self.images.upload(image).await {
            Ok(url) => Ok(url),
            Err(e) => {
                warn!(error = %e, "image upload failed, product not written");
                Err(e.into())
            }
        }
    }
}
