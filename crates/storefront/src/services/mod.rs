//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `menu` - Cached public menu
//! - `orders` - Transactional order placement

pub mod menu;
pub mod orders;

pub use menu::MenuCache;
pub use orders::{OrderError, OrderWriter, PlacedOrder, create_order, place_order};
