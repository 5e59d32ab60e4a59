//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are stored as `NUMERIC(12, 2)` and handled as [`Decimal`] so that
//! order totals never drift, whatever mix of whole and fractional prices the
//! catalog holds.

use std::iter::Sum;
use std::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A non-currency-tagged price amount.
///
/// The shop trades in a single currency ([`CurrencyCode::IDR`]), so amounts
/// are carried without a currency field and formatted with
/// [`Price::display`].
///
/// Serialized as a decimal string; deserializes from a string or a JSON
/// number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(transparent))]
pub struct Price(Decimal);

impl Price {
    /// A zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Decimal places a stored amount keeps (`NUMERIC(12, 2)`).
    pub const SCALE: u32 = 2;

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of currency units.
    #[must_use]
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Whether the amount can be stored without rounding.
    #[must_use]
    pub fn fits_scale(&self) -> bool {
        self.0.normalize().scale() <= Self::SCALE
    }

    /// Price multiplied by a quantity (a line subtotal).
    #[must_use]
    pub fn times(self, quantity: i32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Format for display (e.g., "Rp 22.000").
    ///
    /// Thousands are grouped with `.` and any fractional part is shown after
    /// `,`, following Indonesian convention.
    #[must_use]
    pub fn display(&self) -> String {
        let normalized = self.0.normalize();
        let sign = if normalized.is_sign_negative() && !normalized.is_zero() {
            "-"
        } else {
            ""
        };
        let text = normalized.abs().to_string();
        let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), ""));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        if frac.is_empty() {
            format!("{sign}{} {grouped}", CurrencyCode::IDR.symbol())
        } else {
            format!("{sign}{} {grouped},{frac}", CurrencyCode::IDR.symbol())
        }
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Serialize::serialize(&self.0, serializer)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Text(String),
    Whole(i64),
    Fraction(f64),
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = match RawPrice::deserialize(deserializer)? {
            RawPrice::Text(s) => s.trim().parse::<Decimal>().map_err(serde::de::Error::custom)?,
            RawPrice::Whole(n) => Decimal::from(n),
            RawPrice::Fraction(f) => Decimal::try_from(f).map_err(serde::de::Error::custom)?,
        };
        Ok(Self(amount))
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Mul<i32> for Price {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self::Output {
        self.times(rhs)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    IDR,
}

impl CurrencyCode {
    /// Display symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::IDR => "Rp",
        }
    }
}
