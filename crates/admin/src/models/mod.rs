//! Domain models for the admin API.

pub mod catalog;
pub mod order;
pub mod profile;
pub mod session;

pub use catalog::{
    AddOn, Category, CategoryInput, InputError, PricedInput, Product, ProductDetail, ProductInput, ReadyDate,
    ReadyDateInput, Variant,
};
pub use order::{
    OrderDetail, OrderFilter, OrderHeader, OrderItemAddOnDetail, OrderItemDetail, OrderSummary,
    StatusUpdate,
};
pub use profile::{OwnerProfile, ProfileInput};
pub use session::{CurrentAdmin, keys as session_keys};
