//! Session-stored admin identity.

use serde::{Deserialize, Serialize};

use endulque_core::OwnerId;

/// The logged-in owner.
///
/// `access_token` is the auth provider's bearer token for this login. It is
/// kept server-side in the session store and is needed to sign out and to
/// change the password.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub user_id: OwnerId,
    pub email: String,
    pub access_token: String,
}

impl std::fmt::Debug for CurrentAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentAdmin")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
