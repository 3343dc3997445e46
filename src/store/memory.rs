//! In-memory backing. Same ordering and filtering rules as the SQL store.

use std::collections::BTreeSet;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use crate::domain::aggregates::{Product, ProductDraft};
use crate::domain::value_objects::ProductId;
use super::{ProductStore, StoreError};

#[derive(Default)]
pub struct MemoryProductStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: ProductId,
    rows: Vec<Product>,
}

impl MemoryProductStore {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    fn backend(&self) -> &'static str { "memory" }

    async fn ping(&self) -> Result<(), StoreError> { Ok(()) }

    async fn list(&self, category: Option<&str>) -> Result<Vec<Product>, StoreError> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<Product> = inner.rows.iter()
            .filter(|p| category.map_or(true, |c| p.category.as_deref() == Some(c)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.inner.lock().await.rows.iter().find(|p| p.id == id).cloned())
    }

    async fn categories(&self) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.lock().await;
        let set: BTreeSet<&String> = inner.rows.iter().filter_map(|p| p.category.as_ref()).collect();
        Ok(set.into_iter().cloned().collect())
    }

    async fn insert(&self, draft: ProductDraft) -> Result<Product, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let product = Product::from_draft(inner.next_id, draft, Utc::now());
        inner.rows.push(product.clone());
        Ok(product)
    }

    async fn update(&self, id: ProductId, draft: ProductDraft) -> Result<Option<Product>, StoreError> {
        let mut inner = self.inner.lock().await;
        Ok(inner.rows.iter_mut().find(|p| p.id == id).map(|p| { p.overwrite(draft); p.clone() }))
    }

    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        let before = inner.rows.len();
        inner.rows.retain(|p| p.id != id);
        Ok(inner.rows.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Price;

    fn draft(name: &str, category: Option<&str>) -> ProductDraft {
        ProductDraft { name: name.into(), description: None, price: Price::parse("1.50").unwrap(), image_url: None, category: category.map(Into::into) }
    }

    #[tokio::test]
    async fn test_list_newest_first_and_filtered() {
        let store = MemoryProductStore::new();
        store.insert(draft("a", Some("Labiales"))).await.unwrap();
        store.insert(draft("b", Some("Ojos"))).await.unwrap();
        store.insert(draft("c", Some("Labiales"))).await.unwrap();
        let names: Vec<_> = store.list(None).await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["c", "b", "a"]);
        let lips: Vec<_> = store.list(Some("Labiales")).await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(lips, ["c", "a"]);
        assert!(store.list(Some("labiales")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_categories_distinct_sorted() {
        let store = MemoryProductStore::new();
        for (n, c) in [("a", Some("Ojos")), ("b", None), ("c", Some("Labiales")), ("d", Some("Ojos"))] {
            store.insert(draft(n, c)).await.unwrap();
        }
        assert_eq!(store.categories().await.unwrap(), ["Labiales", "Ojos"]);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let store = MemoryProductStore::new();
        assert!(store.update(9, draft("x", None)).await.unwrap().is_none());
        assert!(!store.delete(9).await.unwrap());
        let p = store.insert(draft("x", None)).await.unwrap();
        let u = store.update(p.id, draft("y", Some("Ojos"))).await.unwrap().unwrap();
        assert_eq!((u.id, u.name.as_str(), u.created_at), (p.id, "y", p.created_at));
        assert!(store.delete(p.id).await.unwrap());
        assert!(store.get(p.id).await.unwrap().is_none());
    }
}
