//! HTTP middleware for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, bound in `main`)
//! 2. `TraceLayer` (request tracing)
//! 3. Response security headers
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//! 5. Auth extractors on protected handlers

pub mod auth;
pub mod session;

pub use auth::{OptionalAdminAuth, RequireAdminAuth, clear_current_admin, set_current_admin};
pub use session::create_session_layer;
