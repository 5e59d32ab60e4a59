//! Say! Endulque Core - Shared types library.
//!
//! This crate provides common types used across all Endulque components:
//! - `storefront` - Public menu, cart, and checkout API
//! - `admin` - Owner administration API (catalog, orders, settings)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, phone numbers, and statuses
//! - [`order`] - Order placement input and the order total computation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod order;
pub mod types;

pub use order::{AddOnLine, BuyerInfo, CartLine, NewOrder, OrderValidationError};
pub use types::*;
