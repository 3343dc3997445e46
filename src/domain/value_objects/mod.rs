//! Value Objects for the catalog
//!
//! Money is carried as integer cents everywhere below the HTTP boundary.
//! Decimal text only appears when parsing client input and when rendering.

use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Store-assigned product identifier.
pub type ProductId = i64;

/// Parses a decimal amount and converts it to cents, rounding half away from zero.
pub fn to_minor_units(input: &str) -> Result<i64, PriceError> {
    let trimmed = input.trim();
    if trimmed.is_empty() { return Err(PriceError::Empty); }
    let amount = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| PriceError::NotNumeric(trimmed.to_string()))?;
    if amount.is_sign_negative() && !amount.is_zero() { return Err(PriceError::Negative); }
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or(PriceError::OutOfRange)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PriceError::OutOfRange)
}

/// Renders cents as a decimal string with exactly two fractional digits.
pub fn to_decimal(minor_units: i64) -> String { Decimal::new(minor_units, 2).to_string() }

/// Non-negative price in cents
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "PriceRepr", into = "String")]
pub struct Price(i64);

impl Price {
    pub const ZERO: Price = Price(0);

    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        if cents < 0 { return Err(PriceError::Negative); }
        Ok(Self(cents))
    }
    pub fn parse(input: &str) -> Result<Self, PriceError> { to_minor_units(input).map(Self) }
    pub fn cents(&self) -> i64 { self.0 }
    pub fn add(&self, other: Price) -> Price { Price(self.0.saturating_add(other.0)) }
    pub fn multiply(&self, qty: u32) -> Price { Price(self.0.saturating_mul(i64::from(qty))) }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", to_decimal(self.0)) }
}

impl FromStr for Price {
    type Err = PriceError;
    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s) }
}

impl From<Price> for String {
    fn from(price: Price) -> Self { price.to_string() }
}

impl std::iter::Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Self { iter.fold(Price::ZERO, |acc, p| acc.add(p)) }
}

// Older cart snapshots stored prices as JSON numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum PriceRepr { Text(String), Number(f64) }

impl TryFrom<PriceRepr> for Price {
    type Error = PriceError;
    fn try_from(repr: PriceRepr) -> Result<Self, Self::Error> {
        match repr {
            PriceRepr::Text(s) => Price::parse(&s),
            PriceRepr::Number(n) => Price::parse(&n.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    #[error("price is required")]
    Empty,
    #[error("price is not a number: {0}")]
    NotNumeric(String),
    #[error("price cannot be negative")]
    Negative,
    #[error("price is out of range")]
    OutOfRange,
}
