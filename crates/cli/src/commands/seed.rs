//! Sample catalog for local development.
//!
//! Inserts a few categories and products, with variants, add-ons and ready
//! dates over the coming week, through the admin repositories.

use chrono::{Duration, Local};
use secrecy::SecretString;

use endulque_admin::db::{
    self, AddOnRepository, CategoryRepository, ProductRepository, ReadyDateRepository,
    VariantRepository,
};
use endulque_admin::models::{
    CategoryInput, PricedInput, ProductInput, ReadyDateInput,
};
use endulque_core::{CategoryId, OwnerId, Price};

struct SampleProduct {
    name: &'static str,
    description: &'static str,
    category: usize,
    variants: &'static [(&'static str, i64)],
    add_ons: &'static [(&'static str, i64)],
    /// Days from today on which the product is ready.
    ready_in_days: &'static [i64],
}

const CATEGORIES: &[&str] = &["Kue", "Minuman"];

const PRODUCTS: &[SampleProduct] = &[
    SampleProduct {
        name: "Bolu Pandan",
        description: "Bolu lembut dengan daun pandan asli.",
        category: 0,
        variants: &[("Kecil", 45_000), ("Besar", 85_000)],
        add_ons: &[("Topping Keju", 5_000), ("Kartu Ucapan", 2_000)],
        ready_in_days: &[2, 3, 5],
    },
    SampleProduct {
        name: "Brownies Panggang",
        description: "Brownies cokelat panggang, potongan 20x20.",
        category: 0,
        variants: &[("Original", 60_000), ("Almond", 70_000)],
        add_ons: &[("Kartu Ucapan", 2_000)],
        ready_in_days: &[1, 4],
    },
    SampleProduct {
        name: "Es Kopi Susu",
        description: "Kopi susu gula aren, 250 ml.",
        category: 1,
        variants: &[("Reguler", 18_000), ("Literan", 85_000)],
        add_ons: &[("Extra Shot", 6_000)],
        ready_in_days: &[1, 2, 3, 4, 5, 6, 7],
    },
];

/// Insert the sample catalog for `owner`.
///
/// Does nothing if the owner already has products, unless `force` is set.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run(
    database_url: &SecretString,
    owner: OwnerId,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let pool = db::create_pool(database_url).await?;

    let products = ProductRepository::new(&pool);
    if !force && !products.list(owner, None).await?.is_empty() {
        tracing::info!(%owner, "Owner already has products, skipping (use --force)");
        return Ok(());
    }

    let categories = CategoryRepository::new(&pool);
    let mut category_ids: Vec<CategoryId> = Vec::with_capacity(CATEGORIES.len());
    for name in CATEGORIES {
        let input = CategoryInput {
            name: (*name).to_string(),
        }
        .validate()?;
        let category = match categories.create(owner, &input).await {
            Ok(category) => category.id,
            // Re-seeding with --force keeps existing categories.
            Err(db::RepositoryError::Conflict(_)) => categories
                .list(owner)
                .await?
                .into_iter()
                .find(|c| c.name == input.name)
                .map(|c| c.id)
                .ok_or("category vanished during seeding")?,
            Err(e) => return Err(e.into()),
        };
        category_ids.push(category);
    }

    let variants = VariantRepository::new(&pool);
    let add_ons = AddOnRepository::new(&pool);
    let ready_dates = ReadyDateRepository::new(&pool);
    let today = Local::now().date_naive();

    for sample in PRODUCTS {
        let input = ProductInput {
            name: sample.name.to_string(),
            description: sample.description.to_string(),
            category_id: category_ids.get(sample.category).copied(),
            is_active: true,
        }
        .validate()?;
        let product = products.create(owner, &input).await?;

        for (name, price) in sample.variants {
            let input = PricedInput {
                name: (*name).to_string(),
                price: Price::from_units(*price),
            }
            .validate()?;
            variants.create(owner, product.id, &input).await?;
        }
        for (name, price) in sample.add_ons {
            let input = PricedInput {
                name: (*name).to_string(),
                price: Price::from_units(*price),
            }
            .validate()?;
            add_ons.create(owner, product.id, &input).await?;
        }
        for days in sample.ready_in_days {
            let input = ReadyDateInput {
                ready_on: today + Duration::days(*days),
            };
            ready_dates.create(owner, product.id, &input).await?;
        }

        tracing::info!(product_id = %product.id, name = sample.name, "Seeded product");
    }

    tracing::info!(products = PRODUCTS.len(), "Seeding complete");
    Ok(())
}
