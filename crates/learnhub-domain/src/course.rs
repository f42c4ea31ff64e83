//! Course pricing rules.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::ToPrimitive;

/// Image used when a course is created without one.
pub const DEFAULT_COURSE_IMAGE: &str = "/uploads/course.png";

/// Largest amount a `numeric(10,2)` column holds.
fn max_price() -> Decimal {
    Decimal::new(99_999_999_99, 2)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    #[error("price must be a number")]
    NotANumber,
    #[error("price cannot be negative")]
    Negative,
    #[error("price is too large")]
    TooLarge,
}

/// Parse a user-supplied price into a non-negative amount with at most two
/// fractional digits (extra digits are rounded half away from zero).
pub fn parse_price(raw: &str) -> Result<Decimal, PriceError> {
    let value = Decimal::from_str(raw.trim()).map_err(|_| PriceError::NotANumber)?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(PriceError::Negative);
    }
    let value = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if value > max_price() {
        return Err(PriceError::TooLarge);
    }
    Ok(value.abs())
}

/// A course is paid whenever its price is above zero.
pub fn is_paid(price: Decimal) -> bool {
    price > Decimal::ZERO
}

/// Price in minor currency units (cents), as the payment provider expects.
pub fn minor_units(price: Decimal) -> Option<i64> {
    (price * Decimal::ONE_HUNDRED).round().to_i64()
}
