//! Cart Aggregate
//!
//! The cart lives with the shopper, never on the server. [`CartSession`] pairs
//! the pure [`Cart`] with a [`CartStorage`] port and writes through after
//! every mutation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;
use crate::domain::aggregates::product::Product;
use crate::domain::value_objects::{Price, ProductId};

/// Storage key the cart snapshot is saved under.
pub const CART_STORAGE_KEY: &str = "kerovic_cart";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(rename = "id")]
    pub product_id: ProductId,
    pub name: String,
    #[serde(rename = "price")]
    pub unit_price: Price,
    pub image_url: Option<String>,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> Price { self.unit_price.multiply(self.quantity) }
}

impl Cart {
    pub fn new() -> Self { Self::default() }

    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn total(&self) -> Price { self.items.iter().map(CartItem::line_total).sum() }
    pub fn count(&self) -> u32 { self.items.iter().fold(0u32, |acc, i| acc.saturating_add(i.quantity)) }

    /// Adds one unit, snapshotting name, price and image on first add.
    pub fn add(&mut self, product: &Product) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            existing.quantity = existing.quantity.saturating_add(1);
        } else {
            self.items.push(CartItem {
                product_id: product.id,
                name: product.name.clone(),
                unit_price: product.price,
                image_url: product.image_url.clone(),
                quantity: 1,
            });
        }
    }

    /// Shifts a line's quantity by `delta`; a result of zero or less drops the line.
    pub fn update_quantity(&mut self, product_id: ProductId, delta: i64) {
        let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) else { return };
        let next = i64::from(item.quantity).saturating_add(delta);
        if next <= 0 {
            self.remove(product_id);
        } else {
            item.quantity = u32::try_from(next).unwrap_or(u32::MAX);
        }
    }

    pub fn remove(&mut self, product_id: ProductId) { self.items.retain(|i| i.product_id != product_id); }

    pub fn clear(&mut self) { self.items.clear(); }

    // Snapshots written by hand-edited storage can carry zero quantities or duplicates.
    fn normalise(mut self) -> Self {
        let mut merged: Vec<CartItem> = Vec::with_capacity(self.items.len());
        for item in self.items.drain(..).filter(|i| i.quantity > 0) {
            match merged.iter_mut().find(|m| m.product_id == item.product_id) {
                Some(m) => m.quantity = m.quantity.saturating_add(item.quantity),
                None => merged.push(item),
            }
        }
        Self { items: merged }
    }
}

/// Get/set port for the serialised cart.
pub trait CartStorage {
    fn load(&self, key: &str) -> Result<Option<String>, CartStorageError>;
    fn save(&self, key: &str, value: &str) -> Result<(), CartStorageError>;
}

impl<T: CartStorage + ?Sized> CartStorage for &T {
    fn load(&self, key: &str) -> Result<Option<String>, CartStorageError> { (**self).load(key) }
    fn save(&self, key: &str, value: &str) -> Result<(), CartStorageError> { (**self).save(key, value) }
}

#[derive(Debug, thiserror::Error)]
pub enum CartStorageError {
    #[error("cart storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cart snapshot is not valid: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("cart storage unavailable: {0}")]
    Unavailable(String),
}

/// In-process storage, mainly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryCartStorage {
    slots: Mutex<std::collections::HashMap<String, String>>,
}

impl CartStorage for MemoryCartStorage {
    fn load(&self, key: &str) -> Result<Option<String>, CartStorageError> {
        let slots = self.slots.lock().map_err(|e| CartStorageError::Unavailable(e.to_string()))?;
        Ok(slots.get(key).cloned())
    }
    fn save(&self, key: &str, value: &str) -> Result<(), CartStorageError> {
        let mut slots = self.slots.lock().map_err(|e| CartStorageError::Unavailable(e.to_string()))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileCartStorage {
    dir: PathBuf,
}

impl FileCartStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }
    fn path(&self, key: &str) -> PathBuf { self.dir.join(format!("{key}.json")) }
}

impl CartStorage for FileCartStorage {
    fn load(&self, key: &str) -> Result<Option<String>, CartStorageError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
    fn save(&self, key: &str, value: &str) -> Result<(), CartStorageError> {
        std::fs::create_dir_all(&self.dir)?;
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        std::fs::write(&tmp, value)?;
        std::fs::rename(tmp, self.path(key))?;
        Ok(())
    }
}

/// Result of the write-through after a mutation. A failed save never undoes the mutation.
#[must_use]
#[derive(Debug)]
pub enum SaveOutcome {
    Saved,
    Unsaved(CartStorageError),
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool { matches!(self, Self::Saved) }
}

/// A shopper's cart bound to its storage.
pub struct CartSession<S: CartStorage> {
    cart: Cart,
    storage: S,
}

impl<S: CartStorage> CartSession<S> {
    /// Restores the saved cart. Unreadable snapshots start an empty cart.
    pub fn restore(storage: S) -> Self {
        let cart = match storage.load(CART_STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Cart>(&raw) {
                Ok(cart) => cart.normalise(),
                Err(e) => {
                    tracing::warn!(error = %e, "discarding unreadable cart snapshot");
                    Cart::new()
                }
            },
            Ok(None) => Cart::new(),
            Err(e) => {
                tracing::warn!(error = %e, "cart storage unavailable, starting empty");
                Cart::new()
            }
        };
        Self { cart, storage }
    }

    pub fn cart(&self) -> &Cart { &self.cart }
    pub fn total(&self) -> Price { self.cart.total() }
    pub fn count(&self) -> u32 { self.cart.count() }

    pub fn add(&mut self, product: &Product) -> SaveOutcome { self.cart.add(product); self.persist() }
    pub fn update_quantity(&mut self, product_id: ProductId, delta: i64) -> SaveOutcome { self.cart.update_quantity(product_id, delta); self.persist() }
    pub fn remove(&mut self, product_id: ProductId) -> SaveOutcome { self.cart.remove(product_id); self.persist() }
    pub fn clear(&mut self) -> SaveOutcome { self.cart.clear(); self.persist() }

    fn persist(&self) -> SaveOutcome {
        let written = serde_json::to_string(&self.cart)
            .map_err(CartStorageError::from)
            .and_then(|raw| self.storage.save(CART_STORAGE_KEY, &raw));
        match written {
            Ok(()) => SaveOutcome::Saved,
            Err(e) => {
                tracing::warn!(error = %e, "cart change not saved");
                SaveOutcome::Unsaved(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: ProductId, name: &str, price: &str) -> Product {
        Product {
            id, name: name.into(), description: None, price: Price::parse(price).unwrap(),
            image_url: Some(format!("https://img/{id}.png")), category: None, created_at: Utc::now(),
        }
    }

    struct BrokenStorage;
    impl CartStorage for BrokenStorage {
        fn load(&self, _: &str) -> Result<Option<String>, CartStorageError> { Ok(None) }
        fn save(&self, _: &str, _: &str) -> Result<(), CartStorageError> { Err(CartStorageError::Unavailable("quota exceeded".into())) }
    }

    #[test]
    fn test_add_merges_same_product() {
        let mut cart = Cart::new();
        let lipstick = product(1, "Lipstick", "5.00");
        cart.add(&lipstick);
        cart.add(&lipstick);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.total().to_string(), "10.00");
        assert_eq!(cart.count(), 2);
    }

    #[test]
    fn test_price_is_snapshot() {
        let mut cart = Cart::new();
        let mut lipstick = product(1, "Lipstick", "5.00");
        cart.add(&lipstick);
        lipstick.price = Price::parse("9.00").unwrap();
        cart.add(&lipstick);
        assert_eq!(cart.total().to_string(), "10.00");
    }

    #[test]
    fn test_update_quantity_to_zero_removes() {
        let mut cart = Cart::new();
        cart.add(&product(1, "Lipstick", "5.00"));
        cart.add(&product(1, "Lipstick", "5.00"));
        cart.add(&product(2, "Rimel", "3.50"));
        cart.update_quantity(1, -2);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total().to_string(), "3.50");
        cart.update_quantity(2, -10);
        assert!(cart.is_empty());
        cart.update_quantity(99, 1);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new();
        cart.add(&product(1, "Lipstick", "5.00"));
        cart.add(&product(2, "Rimel", "3.50"));
        cart.remove(42);
        assert_eq!(cart.items().len(), 2);
        cart.remove(1);
        assert_eq!(cart.items()[0].product_id, 2);
        cart.clear();
        assert_eq!(cart.count(), 0);
    }

    #[test]
    fn test_session_survives_restore() {
        let storage = MemoryCartStorage::default();
        let mut session = CartSession::restore(&storage);
        assert!(session.add(&product(1, "Lipstick", "5.00")).is_saved());
        assert!(session.update_quantity(1, 2).is_saved());
        let restored = CartSession::restore(&storage);
        assert_eq!(restored.count(), 3);
        assert_eq!(restored.total().to_string(), "15.00");
    }

    #[test]
    fn test_failed_save_keeps_change() {
        let mut session = CartSession::restore(BrokenStorage);
        let outcome = session.add(&product(1, "Lipstick", "5.00"));
        assert!(matches!(outcome, SaveOutcome::Unsaved(CartStorageError::Unavailable(_))));
        assert_eq!(session.count(), 1);
    }

    #[test]
    fn test_restore_normalises_snapshot() {
        let storage = MemoryCartStorage::default();
        storage.save(CART_STORAGE_KEY, r#"[{"id":1,"name":"Lipstick","price":5,"image_url":null,"quantity":1},
            {"id":1,"name":"Lipstick","price":"5.00","image_url":null,"quantity":2},
            {"id":2,"name":"Rimel","price":"3.50","image_url":null,"quantity":0}]"#).unwrap();
        let session = CartSession::restore(&storage);
        assert_eq!(session.cart().items().len(), 1);
        assert_eq!(session.count(), 3);

        storage.save(CART_STORAGE_KEY, "not json").unwrap();
        assert!(CartSession::restore(&storage).cart().is_empty());
    }

    #[test]
    fn test_restore_with_extreme_values() {
        let storage = MemoryCartStorage::default();
        storage.save(CART_STORAGE_KEY, r#"[{"id":1,"name":"Lipstick","price":"5.00","image_url":null,"quantity":4294967295},
            {"id":2,"name":"Rimel","price":"3.50","image_url":null,"quantity":1}]"#).unwrap();
        let session = CartSession::restore(&storage);
        assert_eq!(session.cart().items().len(), 2);
        assert_eq!(session.count(), u32::MAX);

        storage.save(CART_STORAGE_KEY, r#"[{"id":1,"name":"Lipstick","price":5e27,"image_url":null,"quantity":1}]"#).unwrap();
        assert!(CartSession::restore(&storage).cart().is_empty());
    }

    #[test]
    fn test_file_storage() {
        let dir = std::env::temp_dir().join(format!("cart-{}", uuid::Uuid::new_v4()));
        let storage = FileCartStorage::new(&dir);
        assert_eq!(storage.load(CART_STORAGE_KEY).unwrap(), None);
        let mut session = CartSession::restore(storage.clone());
        assert!(session.add(&product(3, "Base", "12.25")).is_saved());
        assert_eq!(CartSession::restore(storage).total().to_string(), "12.25");
        std::fs::remove_dir_all(dir).ok();
    }
}
