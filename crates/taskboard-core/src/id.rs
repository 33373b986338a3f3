//! Opaque entity reference parsing.
//!
//! External callers hand ids around as strings; everything past this
//! boundary works with the store's native key type.

use uuid::Uuid;

use crate::{TaskboardError, TaskboardResult};

/// Parse an opaque entity reference into a store key.
pub fn parse_id(raw: &str) -> TaskboardResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| TaskboardError::Validation(format!("invalid entity id: {raw:?}")))
}

/// Parse a whole order array, rejecting the batch on the first bad element.
pub fn parse_ids<S: AsRef<str>>(raw: &[S]) -> TaskboardResult<Vec<Uuid>> {
    raw.iter().map(|s| parse_id(s.as_ref())).collect()
}
