//! Prices in Uzbek so'm and discount arithmetic.
//!
//! Amounts are whole so'm; the currency has no minor unit in everyday use.
//! Discounts use decimal arithmetic so that fractional percentages round the
//! same way everywhere.

use core::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};

/// A price in whole so'm (UZS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// The zero price; also what a missing price field reads as.
    pub const ZERO: Self = Self(0);

    /// Create a price from a whole so'm amount.
    #[must_use]
    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    /// The amount in so'm.
    #[must_use]
    pub const fn amount(self) -> u64 {
        self.0
    }

    /// Price after applying `discount`, rounded half away from zero.
    ///
    /// ```
    /// use bozor_core::{DiscountPercent, Price};
    ///
    /// let price = Price::new(100_000);
    /// assert_eq!(price.discounted(DiscountPercent::new(25)), Price::new(75_000));
    /// ```
    #[must_use]
    pub fn discounted(self, discount: DiscountPercent) -> Self {
        let factor = (Decimal::ONE_HUNDRED - discount.0) / Decimal::ONE_HUNDRED;
        let value = (Decimal::from(self.0) * factor)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        Self(value.to_u64().unwrap_or(0))
    }

    /// Format with grouped thousands, e.g. `1 250 000 UZS`.
    #[must_use]
    pub fn display(self) -> String {
        let digits = self.0.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(' ');
            }
            grouped.push(c);
        }
        grouped.push_str(" UZS");
        grouped
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<u64> for Price {
    fn from(amount: u64) -> Self {
        Self(amount)
    }
}

/// Stored prices were written by a browser client as JS numbers or form
/// strings; accept any of them and treat garbage as zero.
impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Self(lenient_amount(&value)))
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // positive, rounded
fn lenient_amount(value: &serde_json::Value) -> u64 {
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f.round() as u64))
            .unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    }
}

/// A discount percentage, always within `0..=100`.
///
/// Values above 100 clamp to 100 and negative values clamp to 0, both at
/// construction and when read from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DiscountPercent(Decimal);

impl DiscountPercent {
    /// No discount.
    pub const NONE: Self = Self(Decimal::ZERO);

    /// Create a discount from a whole percentage.
    #[must_use]
    pub fn new(percent: u32) -> Self {
        Self::from_decimal(Decimal::from(percent))
    }

    /// Create a discount from a possibly fractional percentage.
    #[must_use]
    pub fn from_decimal(percent: Decimal) -> Self {
        Self(percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED))
    }

    /// The percentage value.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Whether any discount applies.
    #[must_use]
    pub fn is_discounted(self) -> bool {
        self.0 > Decimal::ZERO
    }
}

/// Written as a plain JSON number so other clients of the store can read it.
impl Serialize for DiscountPercent {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.fract().is_zero() {
            serializer.serialize_u64(self.0.to_u64().unwrap_or(0))
        } else {
            serializer.serialize_f64(self.0.to_f64().unwrap_or(0.0))
        }
    }
}

impl<'de> Deserialize<'de> for DiscountPercent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let percent = match &value {
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Decimal::from)
                .or_else(|| n.as_f64().and_then(Decimal::from_f64_retain)),
            serde_json::Value::String(s) => s.trim().parse::<Decimal>().ok(),
            _ => None,
        };
        Ok(Self::from_decimal(percent.unwrap_or(Decimal::ZERO)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_quarter_off_one_hundred_thousand() {
        assert_eq!(
            Price::new(100_000).discounted(DiscountPercent::new(25)),
            Price::new(75_000)
        );
    }

    #[test]
    fn test_discount_bounds() {
        let price = Price::new(48_500);
        assert_eq!(price.discounted(DiscountPercent::NONE), price);
        assert_eq!(price.discounted(DiscountPercent::new(100)), Price::ZERO);
    }

    #[test]
    fn test_discount_above_hundred_clamps() {
        let over = DiscountPercent::new(150);
        assert_eq!(over, DiscountPercent::new(100));
        assert_eq!(Price::new(10_000).discounted(over), Price::ZERO);
    }

    #[test]
    fn test_discount_rounds_half_up() {
        // 999 * 0.5 = 499.5
        assert_eq!(
            Price::new(999).discounted(DiscountPercent::new(50)),
            Price::new(500)
        );
        // 1001 * 0.67 = 670.67
        assert_eq!(
            Price::new(1001).discounted(DiscountPercent::new(33)),
            Price::new(671)
        );
    }

    #[test]
    fn test_fractional_discount() {
        let discount = DiscountPercent::from_decimal(Decimal::new(125, 1)); // 12.5%
        assert_eq!(Price::new(8_000).discounted(discount), Price::new(7_000));
    }

    #[test]
    fn test_lenient_deserialize() {
        let from_float: Price = serde_json::from_str("1500.6").unwrap();
        assert_eq!(from_float, Price::new(1501));
        let from_string: Price = serde_json::from_str("\"2300\"").unwrap();
        assert_eq!(from_string, Price::new(2300));
        let from_null: Price = serde_json::from_str("null").unwrap();
        assert_eq!(from_null, Price::ZERO);
        let negative: Price = serde_json::from_str("-5").unwrap();
        assert_eq!(negative, Price::ZERO);
    }

    #[test]
    fn test_discount_deserialize_clamps() {
        let d: DiscountPercent = serde_json::from_str("120").unwrap();
        assert_eq!(d, DiscountPercent::new(100));
        let d: DiscountPercent = serde_json::from_str("-3").unwrap();
        assert_eq!(d, DiscountPercent::NONE);
    }

    #[test]
    fn test_discount_serializes_as_number() {
        assert_eq!(serde_json::to_string(&DiscountPercent::new(25)).unwrap(), "25");
        let fractional = DiscountPercent::from_decimal(Decimal::new(125, 1));
        assert_eq!(serde_json::to_string(&fractional).unwrap(), "12.5");
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Price::new(1_250_000).display(), "1 250 000 UZS");
        assert_eq!(Price::new(999).display(), "999 UZS");
        assert_eq!(Price::ZERO.to_string(), "0 UZS");
    }
}
