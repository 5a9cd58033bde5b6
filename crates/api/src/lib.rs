//! axum host for `microapi-core` views.
//!
//! Exposes the adapter, middleware, config, router builder, test helpers and
//! the demo blog service so integration tests and the binary entrypoint share
//! them.

pub mod adapter;
pub mod blog;
pub mod config;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod testing;
