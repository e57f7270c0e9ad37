//! HTTP API layer.
//!
//! Exposes the analysis pipeline over a small axum surface: one
//! analysis endpoint plus health and service-info routes.

pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;

pub use error::{ApiError, ApiResult};
pub use routes::{create_router, AppState};
