//! Composite Key Module
//!
//! Two-part identifier used to address cache entries.

use std::fmt;

use serde::Serialize;

// == Composite Key ==
/// Ordered pair of 32-bit identifiers.
///
/// Equality and hashing are over the ordered pair, so `(a, b)` and `(b, a)`
/// address different entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CompositeKey {
    pub part_a: i32,
    pub part_b: i32,
}

impl CompositeKey {
    pub fn new(part_a: i32, part_b: i32) -> Self {
        Self { part_a, part_b }
    }
}

impl From<(i32, i32)> for CompositeKey {
    fn from((part_a, part_b): (i32, i32)) -> Self {
        Self::new(part_a, part_b)
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.part_a, self.part_b)
    }
}
