//! Catalog operations that touch both the database and image storage.

use axum::body::Bytes;
use sqlx::PgPool;
use thiserror::Error;

use endulque_core::{OwnerId, ProductId};

use super::storage::{MENU_FOLDER, PRODUCT_FOLDER, StorageClient, StorageError};
use crate::db::{ProductRepository, ProfileRepository, RepositoryError};
use crate::models::Product;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Storage paths of the images behind `urls` that live in our bucket.
#[must_use]
pub fn owned_paths<'a>(
    storage: &StorageClient,
    urls: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    urls.into_iter()
        .filter_map(|url| storage.object_path_from_public_url(url))
        .collect()
}

/// Delete a product's images, then the product.
///
/// If the images cannot be removed the product is left in place.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` for an unknown product and the
/// store's error if image removal fails.
#[tracing::instrument(skip(pool, storage))]
pub async fn delete_product(
    pool: &PgPool,
    storage: &StorageClient,
    owner: OwnerId,
    id: ProductId,
) -> Result<(), CatalogError> {
    let repo = ProductRepository::new(pool);
    let product = repo.get(owner, id).await?;

    let paths = owned_paths(storage, product.image_url.as_deref());
    storage.remove(&paths).await?;
    repo.delete(owner, id).await?;

    tracing::info!(product_id = %id, images = paths.len(), "Product deleted");
    Ok(())
}

/// Upload a new product image and drop the old one.
///
/// # Errors
///
/// Returns a validation or store error from the upload, or
/// `RepositoryError::NotFound` for an unknown product.
#[tracing::instrument(skip(pool, storage, bytes))]
pub async fn replace_product_image(
    pool: &PgPool,
    storage: &StorageClient,
    owner: OwnerId,
    id: ProductId,
    content_type: &str,
    bytes: Bytes,
) -> Result<Product, CatalogError> {
    let repo = ProductRepository::new(pool);
    // Fail on an unknown product before uploading anything.
    repo.get(owner, id).await?;

    let stored = storage.upload(PRODUCT_FOLDER, content_type, bytes).await?;
    let previous = match repo.set_image(owner, id, Some(&stored.public_url)).await {
        Ok(previous) => previous,
        Err(e) => {
            discard(storage, vec![stored.path]).await;
            return Err(e.into());
        }
    };
    discard(storage, owned_paths(storage, previous.as_deref())).await;

    Ok(repo.get(owner, id).await?)
}

/// Upload a new menu image for the owner profile and drop the old one.
///
/// # Errors
///
/// Returns a validation or store error from the upload.
#[tracing::instrument(skip(pool, storage, bytes))]
pub async fn replace_menu_image(
    pool: &PgPool,
    storage: &StorageClient,
    owner: OwnerId,
    content_type: &str,
    bytes: Bytes,
) -> Result<String, CatalogError> {
    let stored = storage.upload(MENU_FOLDER, content_type, bytes).await?;
    let previous = match ProfileRepository::new(pool)
        .set_menu_image(owner, &stored.public_url)
        .await
    {
        Ok(previous) => previous,
        Err(e) => {
            discard(storage, vec![stored.path]).await;
            return Err(e.into());
        }
    };
    discard(storage, owned_paths(storage, previous.as_deref())).await;
    Ok(stored.public_url)
}

/// Remove objects that are no longer referenced. Failures only leave an
/// orphan behind, so they are logged rather than returned.
async fn discard(storage: &StorageClient, paths: Vec<String>) {
    if let Err(e) = storage.remove(&paths).await {
        tracing::warn!(error = %e, ?paths, "Failed to remove unused images");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::{StorageConfig, SupabaseConfig};

    #[test]
    fn test_owned_paths_skips_foreign_and_missing() {
        let storage = StorageClient::new(
            &SupabaseConfig {
                url: "https://abc.supabase.co".to_string(),
                anon_key: SecretString::from("anon".to_string()),
                service_role_key: SecretString::from("service".to_string()),
                password_reset_redirect_url: None,
            },
            &StorageConfig {
                bucket: "images".to_string(),
                max_upload_bytes: 1024,
            },
        )
        .unwrap();

        let ours = storage.public_url("products/a.png");
        let paths = owned_paths(
            &storage,
            [ours.as_str(), "https://elsewhere.example/b.png"],
        );
        assert_eq!(paths, vec!["products/a.png".to_string()]);
        assert!(owned_paths(&storage, None::<&str>).is_empty());
    }
}
