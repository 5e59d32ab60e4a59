//! Catalog rows and the request bodies that change them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use endulque_core::{AddOnId, CategoryId, Price, ProductId, ReadyDateId, VariantId};

/// Rejected request body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("{0} is required")]
    Blank(&'static str),

    #[error("{0} is too long (max {1} characters)")]
    TooLong(&'static str, usize),

    #[error("{0} is not valid")]
    Invalid(&'static str),

    #[error("price cannot be negative")]
    NegativePrice,

    #[error("price has more than two decimal places")]
    PriceTooPrecise,
}

/// Longest accepted name for any catalog row.
pub const MAX_NAME_LEN: usize = 120;

/// Trim `value` and check it is a usable name.
pub(crate) fn clean_name(field: &'static str, value: &str) -> Result<String, InputError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(InputError::Blank(field));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(InputError::TooLong(field, MAX_NAME_LEN));
    }
    Ok(trimmed.to_string())
}

fn check_price(price: Price) -> Result<(), InputError> {
    if price.is_negative() {
        Err(InputError::NegativePrice)
    } else if !price.fits_scale() {
        Err(InputError::PriceTooPrecise)
    } else {
        Ok(())
    }
}

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Variant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AddOn {
    pub id: AddOnId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ReadyDate {
    pub id: ReadyDateId,
    pub product_id: ProductId,
    pub ready_on: NaiveDate,
}

/// A product with everything attached to it.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub variants: Vec<Variant>,
    pub add_ons: Vec<AddOn>,
    pub ready_dates: Vec<ReadyDate>,
}

// =============================================================================
// Inputs
// =============================================================================

/// Create or rename a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    pub name: String,
}

impl CategoryInput {
    /// # Errors
    ///
    /// Returns `InputError` for a blank or overlong name.
    pub fn validate(&self) -> Result<Self, InputError> {
        Ok(Self {
            name: clean_name("name", &self.name)?,
        })
    }
}

/// Create or replace a product's details. Prices live on variants.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl ProductInput {
    /// # Errors
    ///
    /// Returns `InputError` for a blank or overlong name.
    pub fn validate(&self) -> Result<Self, InputError> {
        Ok(Self {
            name: clean_name("name", &self.name)?,
            description: self.description.trim().to_string(),
            category_id: self.category_id,
            is_active: self.is_active,
        })
    }
}

/// Create or replace a variant or an add-on; both are a priced name.
#[derive(Debug, Clone, Deserialize)]
pub struct PricedInput {
    pub name: String,
    pub price: Price,
}

impl PricedInput {
    /// # Errors
    ///
    /// Returns `InputError` for a blank name, a negative price or a price
    /// with sub-cent digits.
    pub fn validate(&self) -> Result<Self, InputError> {
        check_price(self.price)?;
        Ok(Self {
            name: clean_name("name", &self.name)?,
            price: self.price,
        })
    }
}

/// Add a ready date to a product.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadyDateInput {
    pub ready_on: NaiveDate,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_name_trims() {
        assert_eq!(clean_name("name", "  Kue Lapis ").unwrap(), "Kue Lapis");
        assert_eq!(clean_name("name", "   "), Err(InputError::Blank("name")));
        assert_eq!(
            clean_name("name", &"a".repeat(MAX_NAME_LEN + 1)),
            Err(InputError::TooLong("name", MAX_NAME_LEN))
        );
    }

    #[test]
    fn test_priced_input_rejects_negative() {
        let input = PricedInput {
            name: "Keju".to_string(),
            price: Price::from_units(-1),
        };
        assert_eq!(input.validate().unwrap_err(), InputError::NegativePrice);

        let input = PricedInput {
            name: " Keju ".to_string(),
            price: Price::ZERO,
        };
        assert_eq!(input.validate().unwrap().name, "Keju");

        let input: PricedInput =
            serde_json::from_str(r#"{"name": "Keju", "price": "2000.005"}"#).unwrap();
        assert_eq!(input.validate().unwrap_err(), InputError::PriceTooPrecise);
    }

    #[test]
    fn test_product_input_defaults() {
        let input: ProductInput = serde_json::from_str(r#"{"name": "Brownies"}"#).unwrap();
        assert!(input.is_active);
        assert!(input.category_id.is_none());
        assert_eq!(input.description, "");
    }
}
