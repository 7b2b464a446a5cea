//! # cattery HTTP Server Module
//!
//! Axum front end for the record store.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/api/gatos` - Create and list cats
//! - `/api/gatos/:id` - Fetch, replace and delete one cat

pub mod cat_routes;
pub mod config;
pub mod errors;
pub mod observability_routes;
pub mod server;

pub use config::ServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use server::HttpServer;
