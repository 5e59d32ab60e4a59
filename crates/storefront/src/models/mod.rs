//! Domain models for the storefront.

pub mod cart;
pub mod menu;
pub mod session;

pub use cart::{CartError, CartItem, CartItemAddOn, SessionCart};
pub use menu::{Menu, MenuAddOn, MenuProduct, MenuSection, MenuVariant};
pub use session::keys as session_keys;
