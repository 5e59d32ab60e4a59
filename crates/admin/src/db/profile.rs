//! Owner profile repository.

use sqlx::PgPool;

use endulque_core::OwnerId;

use super::RepositoryError;
use crate::models::{OwnerProfile, ProfileInput};

const PROFILE_COLUMNS: &str =
    "owner_id, business_name, phone, address, menu_image_url, updated_at";

pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load the profile, or an empty one if none was saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, owner: OwnerId) -> Result<OwnerProfile, RepositoryError> {
        let row = sqlx::query_as::<_, OwnerProfile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM owner_profile WHERE owner_id = $1"
        ))
        .bind(owner)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.unwrap_or_else(|| OwnerProfile::empty(owner)))
    }

    /// Insert or replace the business details. The menu image is untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn upsert(
        &self,
        owner: OwnerId,
        input: &ProfileInput,
    ) -> Result<OwnerProfile, RepositoryError> {
        let row = sqlx::query_as::<_, OwnerProfile>(&format!(
            r"
            INSERT INTO owner_profile (owner_id, business_name, phone, address)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (owner_id) DO UPDATE
            SET business_name = EXCLUDED.business_name,
                phone = EXCLUDED.phone,
                address = EXCLUDED.address,
                updated_at = NOW()
            RETURNING {PROFILE_COLUMNS}
            "
        ))
        .bind(owner)
        .bind(&input.business_name)
        .bind(&input.phone)
        .bind(&input.address)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// Point the profile at a new menu image and return the previous URL.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn set_menu_image(
        &self,
        owner: OwnerId,
        url: &str,
    ) -> Result<Option<String>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let previous = sqlx::query_scalar::<_, Option<String>>(
            "SELECT menu_image_url FROM owner_profile WHERE owner_id = $1 FOR UPDATE",
        )
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await?
        .flatten();

        sqlx::query(
            r"
            INSERT INTO owner_profile (owner_id, menu_image_url)
            VALUES ($1, $2)
            ON CONFLICT (owner_id) DO UPDATE
            SET menu_image_url = EXCLUDED.menu_image_url, updated_at = NOW()
            ",
        )
        .bind(owner)
        .bind(url)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(previous)
    }
}
