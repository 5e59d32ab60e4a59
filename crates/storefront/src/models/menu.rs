//! The public menu.
//!
//! The menu is assembled from flat catalog rows into category sections.
//! Assembly is pure so it can be cached and tested without a database.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use endulque_core::{AddOnId, CategoryId, Price, ProductId, VariantId};

/// Section name for products without a (known) category.
pub const UNCATEGORIZED_SECTION: &str = "Lainnya";

/// A purchasable variant of a product (e.g. size or flavour).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct MenuVariant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
}

/// An optional priced extra offered with a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct MenuAddOn {
    pub id: AddOnId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
}

/// A product as shown to buyers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuProduct {
    pub id: ProductId,
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub variants: Vec<MenuVariant>,
    pub add_ons: Vec<MenuAddOn>,
    /// Upcoming dates on which the product can be ready, ascending.
    pub ready_dates: Vec<NaiveDate>,
}

impl MenuProduct {
    /// Look up one of this product's variants.
    #[must_use]
    pub fn variant(&self, id: VariantId) -> Option<&MenuVariant> {
        self.variants.iter().find(|v| v.id == id)
    }

    /// Look up one of this product's add-ons.
    #[must_use]
    pub fn add_on(&self, id: AddOnId) -> Option<&MenuAddOn> {
        self.add_ons.iter().find(|a| a.id == id)
    }

    /// Lowest variant price, shown as "from" price.
    #[must_use]
    pub fn starting_price(&self) -> Option<Price> {
        self.variants.iter().map(|v| v.price).min()
    }

    /// Attach child rows belonging to this product.
    pub fn attach(
        &mut self,
        variants: &mut HashMap<ProductId, Vec<MenuVariant>>,
        add_ons: &mut HashMap<ProductId, Vec<MenuAddOn>>,
        ready_dates: &mut HashMap<ProductId, Vec<NaiveDate>>,
    ) {
        self.variants = variants.remove(&self.id).unwrap_or_default();
        self.add_ons = add_ons.remove(&self.id).unwrap_or_default();
        self.ready_dates = ready_dates.remove(&self.id).unwrap_or_default();
        self.ready_dates.sort_unstable();
    }
}

/// One category heading with its products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuSection {
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub products: Vec<MenuProduct>,
}

/// The whole menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Menu {
    pub sections: Vec<MenuSection>,
}

impl Menu {
    /// Group products into sections.
    ///
    /// Sections follow the order of `categories`; products keep their given
    /// order inside a section. Products without variants cannot be ordered
    /// and are left out. Empty sections are dropped. Products whose category
    /// is missing land in a trailing [`UNCATEGORIZED_SECTION`].
    #[must_use]
    pub fn assemble(categories: Vec<(CategoryId, String)>, products: Vec<MenuProduct>) -> Self {
        let mut by_category: HashMap<Option<CategoryId>, Vec<MenuProduct>> = HashMap::new();
        let known: std::collections::HashSet<CategoryId> =
            categories.iter().map(|(id, _)| *id).collect();

        for product in products.into_iter().filter(|p| !p.variants.is_empty()) {
            let key = product.category_id.filter(|id| known.contains(id));
            by_category.entry(key).or_default().push(product);
        }

        let mut sections: Vec<MenuSection> = categories
            .into_iter()
            .filter_map(|(id, name)| {
                by_category.remove(&Some(id)).map(|products| MenuSection {
                    category_id: Some(id),
                    name,
                    products,
                })
            })
            .collect();

        if let Some(products) = by_category.remove(&None) {
            sections.push(MenuSection {
                category_id: None,
                name: UNCATEGORIZED_SECTION.to_string(),
                products,
            });
        }

        Self { sections }
    }

    /// Find a product anywhere on the menu.
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&MenuProduct> {
        self.sections
            .iter()
            .flat_map(|s| s.products.iter())
            .find(|p| p.id == id)
    }

    /// Number of products on the menu.
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.sections.iter().map(|s| s.products.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, category: Option<i64>, with_variant: bool) -> MenuProduct {
        let variants = if with_variant {
            vec![MenuVariant {
                id: VariantId::new(id * 10),
                product_id: ProductId::new(id),
                name: "Regular".to_string(),
                price: Price::from_units(10_000),
            }]
        } else {
            Vec::new()
        };
        MenuProduct {
            id: ProductId::new(id),
            category_id: category.map(CategoryId::new),
            name: format!("Product {id}"),
            description: String::new(),
            image_url: None,
            variants,
            add_ons: Vec::new(),
            ready_dates: Vec::new(),
        }
    }

    #[test]
    fn test_assemble_groups_by_category_order() {
        let categories = vec![
            (CategoryId::new(2), "Cakes".to_string()),
            (CategoryId::new(1), "Drinks".to_string()),
        ];
        let menu = Menu::assemble(
            categories,
            vec![
                product(1, Some(1), true),
                product(2, Some(2), true),
                product(3, Some(1), true),
            ],
        );

        let names: Vec<_> = menu.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Cakes", "Drinks"]);
        let drink_ids: Vec<_> = menu.sections[1].products.iter().map(|p| p.id).collect();
        assert_eq!(drink_ids, [ProductId::new(1), ProductId::new(3)]);
        assert_eq!(menu.product_count(), 3);
    }

    #[test]
    fn test_assemble_drops_products_without_variants_and_empty_sections() {
        let categories = vec![(CategoryId::new(1), "Cakes".to_string())];
        let menu = Menu::assemble(categories, vec![product(1, Some(1), false)]);
        assert!(menu.sections.is_empty());
    }

    #[test]
    fn test_assemble_uncategorized_goes_last() {
        let categories = vec![(CategoryId::new(1), "Cakes".to_string())];
        let menu = Menu::assemble(
            categories,
            vec![
                product(1, None, true),
                product(2, Some(99), true),
                product(3, Some(1), true),
            ],
        );
        assert_eq!(menu.sections.len(), 2);
        let last = menu.sections.last().map(|s| (s.category_id, s.products.len()));
        assert_eq!(last, Some((None, 2)));
        assert!(menu.product(ProductId::new(2)).is_some());
    }

    #[test]
    fn test_attach_sorts_ready_dates() {
        let mut p = product(1, None, false);
        let mut variants = HashMap::new();
        let mut add_ons = HashMap::new();
        let mut dates = HashMap::from([(
            ProductId::new(1),
            vec![
                NaiveDate::from_ymd_opt(2026, 3, 2).unwrap_or_default(),
                NaiveDate::from_ymd_opt(2026, 3, 1).unwrap_or_default(),
            ],
        )]);
        p.attach(&mut variants, &mut add_ons, &mut dates);
        assert_eq!(
            p.ready_dates.first().copied(),
            NaiveDate::from_ymd_opt(2026, 3, 1)
        );
        assert!(dates.is_empty());
    }
}
