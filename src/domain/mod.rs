//! Catalog domain: products, prices, the shopper cart and order messages.
pub mod aggregates;
pub mod events;
pub mod value_objects;
