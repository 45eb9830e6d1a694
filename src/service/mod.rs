//! Service Module
//!
//! Read-through banner lookup on top of the LFU cache.

mod banner;
mod source;

pub use banner::{BannerService, Role};
pub use source::{Banner, BannerSource, InMemoryBannerSource};
