//! Session cart.
//!
//! The cart lives in the visitor's session. Names and unit prices are
//! resolved from the menu when an item is added, so the cart never carries
//! prices supplied by the client. Checkout re-resolves every item against
//! the current catalog before the order is written.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use endulque_core::{AddOnId, AddOnLine, CartLine, Price, ProductId, VariantId};

use super::menu::{Menu, MenuProduct};

/// Smallest quantity accepted from the cart endpoints.
pub const MIN_QUANTITY: i32 = 1;
/// Largest quantity accepted from the cart endpoints.
pub const MAX_QUANTITY: i32 = 99;

/// Errors raised while changing the cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("product is not available")]
    ProductUnavailable(ProductId),

    #[error("variant {0} does not belong to this product")]
    UnknownVariant(VariantId),

    #[error("add-on {0} does not belong to this product")]
    UnknownAddOn(AddOnId),

    #[error("add-on {0} listed more than once")]
    DuplicateAddOn(AddOnId),

    #[error("quantity must be between {min} and {max}")]
    InvalidQuantity { min: i32, max: i32 },

    #[error("cart has no item at position {0}")]
    ItemNotFound(usize),
}

/// An add-on chosen for a cart item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemAddOn {
    pub add_on_id: AddOnId,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Price,
}

impl CartItemAddOn {
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub variant_id: VariantId,
    pub variant_name: String,
    pub quantity: i32,
    pub unit_price: Price,
    #[serde(default)]
    pub add_ons: Vec<CartItemAddOn>,
}

impl CartItem {
    /// Build a cart item from the menu entry of its product.
    ///
    /// `add_ons` pairs an add-on id with its quantity.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the variant or an add-on does not belong to
    /// `product`, an add-on is repeated, or a quantity is out of range.
    pub fn resolve(
        product: &MenuProduct,
        variant_id: VariantId,
        quantity: i32,
        add_ons: &[(AddOnId, i32)],
    ) -> Result<Self, CartError> {
        check_quantity(quantity)?;
        let variant = product
            .variant(variant_id)
            .ok_or(CartError::UnknownVariant(variant_id))?;

        let mut resolved: Vec<CartItemAddOn> = Vec::with_capacity(add_ons.len());
        for &(add_on_id, add_on_qty) in add_ons {
            check_quantity(add_on_qty)?;
            if resolved.iter().any(|a| a.add_on_id == add_on_id) {
                return Err(CartError::DuplicateAddOn(add_on_id));
            }
            let add_on = product
                .add_on(add_on_id)
                .ok_or(CartError::UnknownAddOn(add_on_id))?;
            resolved.push(CartItemAddOn {
                add_on_id,
                name: add_on.name.clone(),
                quantity: add_on_qty,
                unit_price: add_on.price,
            });
        }
        resolved.sort_by_key(|a| a.add_on_id);

        Ok(Self {
            product_id: product.id,
            product_name: product.name.clone(),
            variant_id,
            variant_name: variant.name.clone(),
            quantity,
            unit_price: variant.price,
            add_ons: resolved,
        })
    }

    /// Line total including add-ons.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.unit_price.times(self.quantity)
            + self.add_ons.iter().map(CartItemAddOn::subtotal).sum::<Price>()
    }

    /// Two items with the same product, variant and set of add-ons are
    /// merged into one line. Add-on quantities may differ.
    fn same_selection(&self, other: &Self) -> bool {
        self.product_id == other.product_id
            && self.variant_id == other.variant_id
            && self.add_ons.len() == other.add_ons.len()
            && self
                .add_ons
                .iter()
                .zip(&other.add_ons)
                .all(|(a, b)| a.add_on_id == b.add_on_id)
    }

    /// Fold `other` into this line. Line and add-on quantities are summed;
    /// prices and names come from `other`, which is the fresher copy.
    fn merge(&mut self, other: Self) -> Result<(), CartError> {
        let quantity = self.quantity + other.quantity;
        check_quantity(quantity)?;
        let mut add_ons = other.add_ons;
        for (merged, current) in add_ons.iter_mut().zip(&self.add_ons) {
            merged.quantity += current.quantity;
            check_quantity(merged.quantity)?;
        }

        self.quantity = quantity;
        self.unit_price = other.unit_price;
        self.product_name = other.product_name;
        self.variant_name = other.variant_name;
        self.add_ons = add_ons;
        Ok(())
    }

    /// Order line for this item.
    #[must_use]
    pub fn to_line(&self) -> CartLine {
        CartLine {
            product_id: self.product_id,
            variant_id: self.variant_id,
            quantity: self.quantity,
            unit_price: self.unit_price,
            add_ons: self
                .add_ons
                .iter()
                .map(|a| AddOnLine {
                    add_on_id: a.add_on_id,
                    quantity: a.quantity,
                    unit_price: a.unit_price,
                })
                .collect(),
        }
    }
}

/// The cart stored in the session under [`super::session_keys::CART`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCart {
    pub items: Vec<CartItem>,
}

impl SessionCart {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> i32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    /// Add an item, merging with an identical line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` if merging would take the line
    /// or one of its add-ons past [`MAX_QUANTITY`]. The cart is unchanged
    /// on error.
    pub fn add(&mut self, item: CartItem) -> Result<(), CartError> {
        if let Some(existing) = self.items.iter_mut().find(|i| i.same_selection(&item)) {
            return existing.merge(item);
        }
        self.items.push(item);
        Ok(())
    }

    /// Change the quantity of the line at `index`.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the index does not exist or the quantity is
    /// out of range.
    pub fn set_quantity(&mut self, index: usize, quantity: i32) -> Result<(), CartError> {
        check_quantity(quantity)?;
        let item = self
            .items
            .get_mut(index)
            .ok_or(CartError::ItemNotFound(index))?;
        item.quantity = quantity;
        Ok(())
    }

    /// Remove the line at `index`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the index does not exist.
    pub fn remove(&mut self, index: usize) -> Result<CartItem, CartError> {
        if index >= self.items.len() {
            return Err(CartError::ItemNotFound(index));
        }
        Ok(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Re-resolve every item against `menu`.
    ///
    /// Prices and names are refreshed from the catalog.
    ///
    /// # Errors
    ///
    /// Returns `CartError` for the first item whose product, variant or
    /// add-ons are no longer on the menu.
    pub fn reprice(&self, menu: &Menu) -> Result<Self, CartError> {
        let items = self
            .items
            .iter()
            .map(|item| {
                let product = menu
                    .product(item.product_id)
                    .ok_or(CartError::ProductUnavailable(item.product_id))?;
                let add_ons: Vec<(AddOnId, i32)> = item
                    .add_ons
                    .iter()
                    .map(|a| (a.add_on_id, a.quantity))
                    .collect();
                CartItem::resolve(product, item.variant_id, item.quantity, &add_ons)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { items })
    }

    /// Order lines for every item, in cart order.
    #[must_use]
    pub fn to_lines(&self) -> Vec<CartLine> {
        self.items.iter().map(CartItem::to_line).collect()
    }
}

fn check_quantity(quantity: i32) -> Result<(), CartError> {
    if (MIN_QUANTITY..=MAX_QUANTITY).contains(&quantity) {
        Ok(())
    } else {
        Err(CartError::InvalidQuantity {
            min: MIN_QUANTITY,
            max: MAX_QUANTITY,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::menu::{MenuAddOn, MenuVariant};

    fn cake() -> MenuProduct {
        MenuProduct {
            id: ProductId::new(1),
            category_id: None,
            name: "Bolu Pandan".to_string(),
            description: String::new(),
            image_url: None,
            variants: vec![
                MenuVariant {
                    id: VariantId::new(10),
                    product_id: ProductId::new(1),
                    name: "Loyang 20cm".to_string(),
                    price: Price::from_units(10_000),
                },
                MenuVariant {
                    id: VariantId::new(11),
                    product_id: ProductId::new(1),
                    name: "Loyang 24cm".to_string(),
                    price: Price::from_units(15_000),
                },
            ],
            add_ons: vec![
                MenuAddOn {
                    id: AddOnId::new(100),
                    product_id: ProductId::new(1),
                    name: "Kartu ucapan".to_string(),
                    price: Price::from_units(2_000),
                },
                MenuAddOn {
                    id: AddOnId::new(101),
                    product_id: ProductId::new(1),
                    name: "Lilin".to_string(),
                    price: Price::from_units(500),
                },
            ],
            ready_dates: Vec::new(),
        }
    }

    #[test]
    fn test_resolve_uses_menu_prices() {
        let item = CartItem::resolve(&cake(), VariantId::new(10), 2, &[(AddOnId::new(100), 1)])
            .unwrap();
        assert_eq!(item.unit_price, Price::from_units(10_000));
        assert_eq!(item.variant_name, "Loyang 20cm");
        assert_eq!(item.add_ons[0].name, "Kartu ucapan");
        assert_eq!(item.subtotal(), Price::from_units(22_000));
    }

    #[test]
    fn test_resolve_rejects_foreign_ids() {
        assert_eq!(
            CartItem::resolve(&cake(), VariantId::new(99), 1, &[]),
            Err(CartError::UnknownVariant(VariantId::new(99)))
        );
        assert_eq!(
            CartItem::resolve(&cake(), VariantId::new(10), 1, &[(AddOnId::new(7), 1)]),
            Err(CartError::UnknownAddOn(AddOnId::new(7)))
        );
        assert_eq!(
            CartItem::resolve(
                &cake(),
                VariantId::new(10),
                1,
                &[(AddOnId::new(100), 1), (AddOnId::new(100), 2)]
            ),
            Err(CartError::DuplicateAddOn(AddOnId::new(100)))
        );
    }

    #[test]
    fn test_resolve_rejects_bad_quantities() {
        for qty in [0, -1, 100] {
            assert!(matches!(
                CartItem::resolve(&cake(), VariantId::new(10), qty, &[]),
                Err(CartError::InvalidQuantity { .. })
            ));
        }
    }

    #[test]
    fn test_add_merges_identical_selection() {
        let mut cart = SessionCart::default();
        let add_ons = [(AddOnId::new(101), 1), (AddOnId::new(100), 1)];
        cart.add(CartItem::resolve(&cake(), VariantId::new(10), 1, &add_ons).unwrap())
            .unwrap();
        // Same add-ons in a different order still merge.
        let reordered = [(AddOnId::new(100), 1), (AddOnId::new(101), 1)];
        cart.add(CartItem::resolve(&cake(), VariantId::new(10), 2, &reordered).unwrap())
            .unwrap();
        cart.add(CartItem::resolve(&cake(), VariantId::new(11), 1, &[]).unwrap())
            .unwrap();

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.items[0].quantity, 3);
        assert!(cart.items[0].add_ons.iter().all(|a| a.quantity == 2));
        assert_eq!(cart.item_count(), 4);
        // 3 × 10.000 + 2 × 2.000 + 2 × 500 + 15.000
        assert_eq!(cart.total(), Price::from_units(50_000));
    }

    #[test]
    fn test_merge_keeps_every_add_on_unit() {
        let mut cart = SessionCart::default();
        let card = [(AddOnId::new(100), 1)];
        for _ in 0..2 {
            cart.add(CartItem::resolve(&cake(), VariantId::new(10), 1, &card).unwrap())
                .unwrap();
        }

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 2);
        assert_eq!(cart.items[0].add_ons[0].quantity, 2);
        assert_eq!(cart.total(), Price::from_units(24_000));
        assert_eq!(cart.to_lines()[0].subtotal(), cart.total());
    }

    #[test]
    fn test_add_on_quantities_differ_still_merge() {
        let mut cart = SessionCart::default();
        cart.add(CartItem::resolve(&cake(), VariantId::new(10), 1, &[(AddOnId::new(101), 3)]).unwrap())
            .unwrap();
        cart.add(CartItem::resolve(&cake(), VariantId::new(10), 1, &[(AddOnId::new(101), 5)]).unwrap())
            .unwrap();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].add_ons[0].quantity, 8);
        // 2 × 10.000 + 8 × 500
        assert_eq!(cart.total(), Price::from_units(24_000));
    }

    #[test]
    fn test_add_refuses_merge_past_limit() {
        let mut cart = SessionCart::default();
        cart.add(CartItem::resolve(&cake(), VariantId::new(10), 60, &[]).unwrap())
            .unwrap();
        let err = cart
            .add(CartItem::resolve(&cake(), VariantId::new(10), 60, &[]).unwrap())
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity { .. }));
        assert_eq!(cart.items[0].quantity, 60);
    }

    #[test]
    fn test_add_refuses_add_on_merge_past_limit() {
        let mut cart = SessionCart::default();
        let candles = [(AddOnId::new(101), 60)];
        cart.add(CartItem::resolve(&cake(), VariantId::new(10), 1, &candles).unwrap())
            .unwrap();
        let err = cart
            .add(CartItem::resolve(&cake(), VariantId::new(10), 1, &candles).unwrap())
            .unwrap_err();

        assert!(matches!(err, CartError::InvalidQuantity { .. }));
        assert_eq!(cart.items[0].quantity, 1);
        assert_eq!(cart.items[0].add_ons[0].quantity, 60);
    }

    #[test]
    fn test_set_quantity_and_remove() {
        let mut cart = SessionCart::default();
        cart.add(CartItem::resolve(&cake(), VariantId::new(10), 1, &[]).unwrap())
            .unwrap();
        cart.set_quantity(0, 5).unwrap();
        assert_eq!(cart.items[0].quantity, 5);
        assert_eq!(cart.set_quantity(3, 1), Err(CartError::ItemNotFound(3)));
        assert_eq!(cart.remove(1), Err(CartError::ItemNotFound(1)));
        cart.remove(0).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_reprice_refreshes_and_detects_removals() {
        let mut cart = SessionCart::default();
        cart.add(CartItem::resolve(&cake(), VariantId::new(10), 2, &[(AddOnId::new(100), 1)]).unwrap())
            .unwrap();

        let mut product = cake();
        product.variants[0].price = Price::from_units(12_000);
        let menu = Menu::assemble(Vec::new(), vec![product.clone()]);
        let repriced = cart.reprice(&menu).unwrap();
        assert_eq!(repriced.items[0].unit_price, Price::from_units(12_000));
        assert_eq!(repriced.total(), Price::from_units(26_000));

        product.add_ons.clear();
        let menu = Menu::assemble(Vec::new(), vec![product]);
        assert_eq!(
            cart.reprice(&menu),
            Err(CartError::UnknownAddOn(AddOnId::new(100)))
        );

        assert_eq!(
            cart.reprice(&Menu::default()),
            Err(CartError::ProductUnavailable(ProductId::new(1)))
        );
    }

    #[test]
    fn test_to_lines_carries_resolved_prices() {
        let mut cart = SessionCart::default();
        cart.add(
            CartItem::resolve(&cake(), VariantId::new(10), 2, &[(AddOnId::new(100), 1)]).unwrap(),
        )
        .unwrap();
        let lines = cart.to_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].unit_price, Price::from_units(10_000));
        assert_eq!(lines[0].add_ons[0].unit_price, Price::from_units(2_000));
        assert_eq!(lines[0].subtotal(), cart.total());
    }
}
