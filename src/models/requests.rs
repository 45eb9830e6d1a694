//! Request DTOs for the banner API
//!
//! Defines the structure of incoming query strings.

use serde::Deserialize;

use crate::error::{Result, ServiceError};

/// Query string of GET /user_banner
///
/// Fields are kept as raw strings so malformed numbers surface as our own
/// JSON 400 instead of the extractor's plain-text rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserBannerQuery {
    pub tag_id: Option<String>,
    pub feature_id: Option<String>,
    pub use_last_revision: Option<String>,
}

/// Validated parameters of GET /user_banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserBannerParams {
    pub tag_id: i32,
    pub feature_id: i32,
    pub use_last_revision: bool,
}

impl UserBannerQuery {
    /// Parses and validates the query.
    pub fn parse(&self) -> Result<UserBannerParams> {
        Ok(UserBannerParams {
            tag_id: parse_id("tag_id", self.tag_id.as_deref())?,
            feature_id: parse_id("feature_id", self.feature_id.as_deref())?,
            use_last_revision: self
                .use_last_revision
                .as_deref()
                .and_then(parse_flag)
                .unwrap_or(false),
        })
    }
}

fn parse_id(name: &str, raw: Option<&str>) -> Result<i32> {
    raw.and_then(|value| value.trim().parse().ok())
        .ok_or_else(|| ServiceError::InvalidRequest(format!("Invalid {}", name)))
}

/// Accepts the usual spellings of a boolean flag.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
