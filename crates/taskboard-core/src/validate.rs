//! Write-path input validation.
//!
//! Validation happens before any store write so a rejected request never
//! leaves a partial document behind.

use crate::{TaskboardError, TaskboardResult};

pub const TITLE_MIN_LEN: usize = 3;
pub const TITLE_MAX_LEN: usize = 32;

/// Validate and normalize a board/list/card title: trimmed, 3..=32 chars.
pub fn validate_title(raw: &str) -> TaskboardResult<String> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len < TITLE_MIN_LEN || len > TITLE_MAX_LEN {
        return Err(TaskboardError::Validation(format!(
            "title must be {TITLE_MIN_LEN}-{TITLE_MAX_LEN} characters, got {len}"
        )));
    }
    Ok(trimmed.to_string())
}
