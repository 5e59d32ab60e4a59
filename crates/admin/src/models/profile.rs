//! Owner profile: business details shown on the storefront.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use endulque_core::{OwnerId, Phone};

use super::catalog::{InputError, clean_name};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OwnerProfile {
    pub owner_id: OwnerId,
    pub business_name: String,
    pub phone: String,
    pub address: String,
    pub menu_image_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl OwnerProfile {
    /// Profile of an owner who has not saved one yet.
    #[must_use]
    pub fn empty(owner_id: OwnerId) -> Self {
        Self {
            owner_id,
            business_name: String::new(),
            phone: String::new(),
            address: String::new(),
            menu_image_url: None,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

/// Replace the owner's business details.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileInput {
    pub business_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

impl ProfileInput {
    /// Trim fields and normalize the phone number. An empty phone is kept
    /// empty.
    ///
    /// # Errors
    ///
    /// Returns `InputError` for a blank business name or a malformed phone.
    pub fn validate(&self) -> Result<Self, InputError> {
        let phone = if self.phone.trim().is_empty() {
            String::new()
        } else {
            Phone::parse(&self.phone)
                .map_err(|_| InputError::Invalid("phone"))?
                .into_inner()
        };
        Ok(Self {
            business_name: clean_name("business_name", &self.business_name)?,
            phone,
            address: self.address.trim().to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_input_validate() {
        let input = ProfileInput {
            business_name: " Say! Endulque ".to_string(),
            phone: String::new(),
            address: " Bandung ".to_string(),
        };
        let clean = input.validate().unwrap();
        assert_eq!(clean.business_name, "Say! Endulque");
        assert_eq!(clean.address, "Bandung");
        assert_eq!(clean.phone, "");

        let input = ProfileInput {
            phone: "abc".to_string(),
            ..clean
        };
        assert_eq!(input.validate().unwrap_err(), InputError::Invalid("phone"));
    }
}
