//! Domain events
use serde::Serialize;
use crate::domain::aggregates::product::Product;
use crate::domain::value_objects::ProductId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogEvent {
    Created { product_id: ProductId, name: String, price_cents: i64 },
    Updated { product_id: ProductId, name: String, price_cents: i64 },
    Deleted { product_id: ProductId, name: String },
}

impl CatalogEvent {
    pub fn created(p: &Product) -> Self { Self::Created { product_id: p.id, name: p.name.clone(), price_cents: p.price.cents() } }
    pub fn updated(p: &Product) -> Self { Self::Updated { product_id: p.id, name: p.name.clone(), price_cents: p.price.cents() } }
    pub fn deleted(p: &Product) -> Self { Self::Deleted { product_id: p.id, name: p.name.clone() } }

    pub fn subject(&self) -> &'static str {
        match self {
            Self::Created { .. } => "catalog.products.created",
            Self::Updated { .. } => "catalog.products.updated",
            Self::Deleted { .. } => "catalog.products.deleted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_payload() {
        let e = CatalogEvent::Deleted { product_id: 3, name: "Rimel".into() };
        assert_eq!(e.subject(), "catalog.products.deleted");
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["kind"], "deleted");
        assert_eq!(json["product_id"], 3);
    }
}
