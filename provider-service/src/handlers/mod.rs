//! HTTP handlers for provider-service.

pub mod health;
pub mod resolve;

pub use health::{health_check, metrics_endpoint};
pub use resolve::resolve_providers;
