//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;

pub use product::{Product, ProductDraft, ProductError, ProductFields};
pub use order::{format_order, CheckoutError, Customer, OrderChannel, OrderMessage};
pub use cart::{Cart, CartItem, CartSession, CartStorage, CartStorageError, FileCartStorage, MemoryCartStorage, SaveOutcome, CART_STORAGE_KEY};
