//! Order placement input.
//!
//! A [`NewOrder`] is everything needed to persist one order: who is buying
//! and what is in the cart, with unit prices already resolved. The total is
//! computed here, before anything is written, so every writer agrees on it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{AddOnId, Price, ProductId, VariantId};

/// Reasons an order is rejected before any write is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderValidationError {
    /// The cart has no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// A buyer field is blank.
    #[error("buyer {0} is required")]
    MissingBuyerField(&'static str),

    /// A cart line has a negative quantity.
    #[error("line {line}: quantity cannot be negative")]
    NegativeQuantity { line: usize },

    /// A cart line has a negative unit price.
    #[error("line {line}: unit price cannot be negative")]
    NegativePrice { line: usize },

    /// An add-on has a negative quantity.
    #[error("line {line}, add-on {add_on}: quantity cannot be negative")]
    NegativeAddOnQuantity { line: usize, add_on: usize },

    /// An add-on has a negative unit price.
    #[error("line {line}, add-on {add_on}: unit price cannot be negative")]
    NegativeAddOnPrice { line: usize, add_on: usize },

    /// A cart line price has more decimal places than can be stored.
    #[error("line {line}: unit price has more than two decimal places")]
    PriceTooPrecise { line: usize },

    /// An add-on price has more decimal places than can be stored.
    #[error("line {line}, add-on {add_on}: unit price has more than two decimal places")]
    AddOnPriceTooPrecise { line: usize, add_on: usize },
}

/// Contact details of the person placing the order.
///
/// Only presence is checked here; the storefront normalises the phone number
/// before it builds the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
}

/// An optional extra attached to a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOnLine {
    pub add_on_id: AddOnId,
    pub quantity: i32,
    pub unit_price: Price,
}

impl AddOnLine {
    /// `unit_price × quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// One product/variant line of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub quantity: i32,
    pub unit_price: Price,
    #[serde(default)]
    pub add_ons: Vec<AddOnLine>,
}

impl CartLine {
    /// Line subtotal including its add-ons.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.unit_price.times(self.quantity) + self.add_ons.iter().map(AddOnLine::subtotal).sum::<Price>()
    }
}

/// A complete order ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub buyer: BuyerInfo,
    pub lines: Vec<CartLine>,
}

impl NewOrder {
    /// `Σ(line price × qty) + Σ(add-on price × qty)` over every line.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Number of add-on rows this order will produce.
    #[must_use]
    pub fn add_on_count(&self) -> usize {
        self.lines.iter().map(|line| line.add_ons.len()).sum()
    }

    /// Check the order can be written.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: empty cart, blank buyer field, or a
    /// negative quantity or price on a line or add-on, or a price with more
    /// than [`Price::SCALE`] decimal places (indices are zero-based).
    pub fn validate(&self) -> Result<(), OrderValidationError> {
        if self.buyer.name.trim().is_empty() {
            return Err(OrderValidationError::MissingBuyerField("name"));
        }
        if self.buyer.address.trim().is_empty() {
            return Err(OrderValidationError::MissingBuyerField("address"));
        }
        if self.buyer.phone.trim().is_empty() {
            return Err(OrderValidationError::MissingBuyerField("phone"));
        }
        if self.lines.is_empty() {
            return Err(OrderValidationError::EmptyCart);
        }

        for (line_idx, line) in self.lines.iter().enumerate() {
            if line.quantity < 0 {
                return Err(OrderValidationError::NegativeQuantity { line: line_idx });
            }
            if line.unit_price.is_negative() {
                return Err(OrderValidationError::NegativePrice { line: line_idx });
            }
            if !line.unit_price.fits_scale() {
                return Err(OrderValidationError::PriceTooPrecise { line: line_idx });
            }
            for (add_on_idx, add_on) in line.add_ons.iter().enumerate() {
                if add_on.quantity < 0 {
                    return Err(OrderValidationError::NegativeAddOnQuantity {
                        line: line_idx,
                        add_on: add_on_idx,
                    });
                }
                if add_on.unit_price.is_negative() {
                    return Err(OrderValidationError::NegativeAddOnPrice {
                        line: line_idx,
                        add_on: add_on_idx,
                    });
                }
                if !add_on.unit_price.fits_scale() {
                    return Err(OrderValidationError::AddOnPriceTooPrecise {
                        line: line_idx,
                        add_on: add_on_idx,
                    });
                }
            }
        }

        Ok(())
    }
}
