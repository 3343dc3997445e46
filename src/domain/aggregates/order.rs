//! Order Aggregate
//!
//! There is no server-side order. Checkout renders the cart into a message
//! for the messaging channel, hands it off, then clears the cart:
//! `Idle -> Formatted -> Cleared -> Idle`.

use std::fmt::Write as _;
use serde::{Deserialize, Serialize};
use crate::domain::aggregates::cart::{Cart, CartSession, CartStorage, SaveOutcome};
use crate::domain::value_objects::Price;

const SEPARATOR: &str = "-----------------";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
}

impl Customer {
    pub fn validate(&self) -> Result<(), CheckoutError> {
        if self.name.trim().is_empty() { return Err(CheckoutError::MissingField("name")); }
        if self.address.trim().is_empty() { return Err(CheckoutError::MissingField("address")); }
        Ok(())
    }

    fn phone(&self) -> Option<&str> { self.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()) }
}

/// Where orders are sent and how the message header reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderChannel {
    pub store_name: String,
    pub destination: String,
}

impl OrderChannel {
    pub fn new(store_name: impl Into<String>, destination: impl Into<String>) -> Self {
        Self { store_name: store_name.into(), destination: destination.into() }
    }

    pub fn redirect_url(&self, text: &str) -> String {
        format!("https://wa.me/{}?text={}", self.destination, urlencoding::encode(text))
    }
}

/// A formatted order, ready for handoff. Consumed by [`CartSession::complete_checkout`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderMessage {
    pub text: String,
    pub redirect_url: String,
    pub total: Price,
}

/// Renders the order text. Deterministic for a given cart and customer.
pub fn format_order(cart: &Cart, customer: &Customer, store_name: &str) -> String {
    let mut msg = String::new();
    let _ = writeln!(msg, "*NUEVO PEDIDO - {store_name}*");
    let _ = writeln!(msg);
    let _ = writeln!(msg, "*Cliente:* {}", customer.name.trim());
    let _ = writeln!(msg, "*Direccion:* {}", customer.address.trim());
    if let Some(phone) = customer.phone() { let _ = writeln!(msg, "*Telefono:* {phone}"); }
    let _ = writeln!(msg);
    let _ = writeln!(msg, "*PRODUCTOS:*");
    let _ = writeln!(msg, "{SEPARATOR}");
    for item in cart.items() {
        let _ = writeln!(msg, "- {}", item.name);
        let _ = writeln!(msg, "  Cantidad: {} x ${}", item.quantity, item.unit_price);
        let _ = writeln!(msg, "  Subtotal: ${}", item.line_total());
        let _ = writeln!(msg);
    }
    let _ = writeln!(msg, "{SEPARATOR}");
    let _ = write!(msg, "*TOTAL: ${}*", cart.total());
    msg
}

impl<S: CartStorage> CartSession<S> {
    /// Idle -> Formatted. Leaves the cart untouched.
    pub fn prepare_checkout(&self, customer: &Customer, channel: &OrderChannel) -> Result<OrderMessage, CheckoutError> {
        if self.cart().is_empty() { return Err(CheckoutError::EmptyCart); }
        customer.validate()?;
        let text = format_order(self.cart(), customer, &channel.store_name);
        let redirect_url = channel.redirect_url(&text);
        Ok(OrderMessage { text, redirect_url, total: self.total() })
    }

    /// Formatted -> Cleared, once the redirect has been triggered.
    pub fn complete_checkout(&mut self, message: OrderMessage) -> SaveOutcome {
        tracing::info!(total = %message.total, "order handed off, clearing cart");
        self.clear()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("missing {0}")]
    MissingField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::domain::aggregates::cart::MemoryCartStorage;
    use crate::domain::aggregates::product::Product;

    fn lipstick() -> Product {
        Product {
            id: 1, name: "Lipstick".into(), description: None, price: Price::parse("5.00").unwrap(),
            image_url: None, category: Some("Labiales".into()), created_at: Utc::now(),
        }
    }

    fn ana() -> Customer { Customer { name: "Ana".into(), address: "Calle 1".into(), phone: None } }

    #[test]
    fn test_format_order() {
        let mut cart = Cart::new();
        cart.add(&lipstick());
        cart.add(&lipstick());
        let text = format_order(&cart, &ana(), "KEROVIC");
        let expected = "*NUEVO PEDIDO - KEROVIC*\n\n*Cliente:* Ana\n*Direccion:* Calle 1\n\n*PRODUCTOS:*\n-----------------\n\
- Lipstick\n  Cantidad: 2 x $5.00\n  Subtotal: $10.00\n\n-----------------\n*TOTAL: $10.00*";
        assert_eq!(text, expected);
        assert_eq!(text.matches("Subtotal:").count(), 1);
        assert!(!text.contains("Telefono"));
    }

    #[test]
    fn test_format_includes_phone() {
        let mut cart = Cart::new();
        cart.add(&lipstick());
        let customer = Customer { phone: Some("0414-555".into()), ..ana() };
        assert!(format_order(&cart, &customer, "KEROVIC").contains("*Telefono:* 0414-555\n"));
        let blank = Customer { phone: Some("  ".into()), ..ana() };
        assert!(!format_order(&cart, &blank, "KEROVIC").contains("Telefono"));
    }

    #[test]
    fn test_checkout_flow() {
        let storage = MemoryCartStorage::default();
        let channel = OrderChannel::new("KEROVIC", "584121410816");
        let mut session = CartSession::restore(&storage);
        let _ = session.add(&lipstick());
        let message = session.prepare_checkout(&ana(), &channel).unwrap();
        assert_eq!(session.count(), 1);
        assert!(message.redirect_url.starts_with("https://wa.me/584121410816?text=%2ANUEVO%20PEDIDO"));
        assert_eq!(message.total.to_string(), "5.00");
        assert!(session.complete_checkout(message).is_saved());
        assert!(session.cart().is_empty());
        assert!(CartSession::restore(&storage).cart().is_empty());
    }

    #[test]
    fn test_checkout_rejects_empty_cart() {
        let storage = MemoryCartStorage::default();
        let session = CartSession::restore(&storage);
        let channel = OrderChannel::new("KEROVIC", "1");
        assert_eq!(session.prepare_checkout(&ana(), &channel), Err(CheckoutError::EmptyCart));
        assert!(session.cart().is_empty());
    }

    #[test]
    fn test_checkout_requires_form() {
        let storage = MemoryCartStorage::default();
        let mut session = CartSession::restore(&storage);
        let _ = session.add(&lipstick());
        let channel = OrderChannel::new("KEROVIC", "1");
        let nameless = Customer { name: " ".into(), ..ana() };
        assert_eq!(session.prepare_checkout(&nameless, &channel), Err(CheckoutError::MissingField("name")));
        let homeless = Customer { address: String::new(), ..ana() };
        assert_eq!(session.prepare_checkout(&homeless, &channel), Err(CheckoutError::MissingField("address")));
        assert_eq!(session.count(), 1);
    }
}
