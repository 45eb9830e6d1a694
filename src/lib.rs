//! Banner Cache - read-through banner lookups over an in-process LFU cache
//!
//! Provides an LFU cache with lazy TTL expiration keyed by `(tag_id, feature_id)`,
//! the read-through banner service built on it, and a small HTTP surface.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_eviction_drain;
