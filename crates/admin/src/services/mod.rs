//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Managed auth provider client (owner sign-in)
//! - `catalog` - Product and menu image lifecycle
//! - `storage` - Managed object storage client

pub mod auth;
pub mod catalog;
pub mod storage;

pub use auth::{AuthClient, AuthError};
pub use catalog::CatalogError;
pub use storage::{StorageClient, StorageError, StoredObject};
