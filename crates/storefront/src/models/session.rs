//! Session-related types.
//!
//! The storefront has no customer accounts; the session only carries the
//! anonymous visitor's cart.

/// Session keys for storefront data.
pub mod keys {
    /// Key for storing the visitor's [`SessionCart`](crate::models::SessionCart).
    pub const CART: &str = "cart";

    /// Key for the id of the last order placed in this session.
    pub const LAST_ORDER_ID: &str = "last_order_id";
}
