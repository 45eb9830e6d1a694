//! API Module
//!
//! HTTP handlers and routing for the banner REST API.
//!
//! # Endpoints
//! - `GET /user_banner?tag_id=&feature_id=&use_last_revision=` - Banner content
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
