//! Background Tasks Module
//!
//! Contains background tasks that run alongside the server.
//!
//! # Tasks
//! - Eviction drain: Consumes capacity-eviction notifications and logs them

mod eviction_drain;

pub use eviction_drain::spawn_eviction_drain;
