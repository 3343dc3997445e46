//! Product Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::domain::value_objects::{Price, PriceError, ProductId};

/// A stored catalog product. Serialises with the price as two-digit decimal text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Raw admin payload, as submitted by the product form.
#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct ProductFields {
    #[validate(length(min = 1, max = 200, message = "name is required"))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub price: String,
    #[validate(length(max = 100))]
    pub category: Option<String>,
}

/// Validated, store-ready product values. The image URL is filled in by the catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub image_url: Option<String>,
    pub category: Option<String>,
}

impl ProductFields {
    /// Trims text, maps blank optionals to `None` and converts the price to cents.
    pub fn into_draft(self) -> Result<ProductDraft, ProductError> {
        let fields = Self {
            name: self.name.trim().to_string(),
            description: non_blank(self.description),
            price: self.price,
            category: non_blank(self.category),
        };
        fields.validate().map_err(|e| ProductError::Invalid(e.to_string()))?;
        let price = Price::parse(&fields.price)?;
        Ok(ProductDraft {
            name: fields.name,
            description: fields.description,
            price,
            image_url: None,
            category: fields.category,
        })
    }
}

impl ProductDraft {
    pub fn with_image_url(mut self, url: Option<String>) -> Self { self.image_url = url; self }
}

impl Product {
    /// Materialises a draft under a store-assigned id and timestamp.
    pub fn from_draft(id: ProductId, draft: ProductDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id, name: draft.name, description: draft.description, price: draft.price,
            image_url: draft.image_url, category: draft.category, created_at,
        }
    }

    /// Overwrites every field from the draft; id and creation time stay.
    pub fn overwrite(&mut self, draft: ProductDraft) {
        self.name = draft.name;
        self.description = draft.description;
        self.price = draft.price;
        self.image_url = draft.image_url;
        self.category = draft.category;
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductError {
    #[error("invalid product: {0}")]
    Invalid(String),
    #[error(transparent)]
    Price(#[from] PriceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: &str, price: &str) -> ProductFields {
        ProductFields { name: name.into(), description: Some("  ".into()), price: price.into(), category: Some(" Labiales ".into()) }
    }

    #[test]
    fn test_into_draft_normalises() {
        let d = fields(" Lipstick ", "5").into_draft().unwrap();
        assert_eq!(d.name, "Lipstick");
        assert_eq!(d.description, None);
        assert_eq!(d.category.as_deref(), Some("Labiales"));
        assert_eq!(d.price.cents(), 500);
        assert_eq!(d.image_url, None);
    }

    #[test]
    fn test_into_draft_rejects() {
        assert!(matches!(fields("   ", "5").into_draft(), Err(ProductError::Invalid(_))));
        assert!(matches!(fields("Lipstick", "cheap").into_draft(), Err(ProductError::Price(PriceError::NotNumeric(_)))));
        assert!(matches!(fields("Lipstick", "").into_draft(), Err(ProductError::Price(PriceError::Empty))));
    }

    #[test]
    fn test_product_json_shape() {
        let draft = fields("Lipstick", "5").into_draft().unwrap().with_image_url(Some("https://img/1.png".into()));
        let p = Product::from_draft(7, draft, Utc::now());
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["price"], "5.00");
        assert_eq!(json["image_url"], "https://img/1.png");
    }
}
