pub mod error;
pub mod id;
pub mod result;
pub mod validate;

pub use error::{ConflictReason, TaskboardError};
pub use id::{parse_id, parse_ids};
pub use result::TaskboardResult;
pub use validate::validate_title;
