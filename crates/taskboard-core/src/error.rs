use thiserror::Error;

/// Distinguishable conflict outcomes. Callers branch on these rather than
/// parsing messages; add-member in particular must tell "user not found"
/// apart from "already a member".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    UserNotFound,
    AlreadyMember,
    EmailTaken,
}

impl std::fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserNotFound => write!(f, "user not found"),
            Self::AlreadyMember => write!(f, "user is already a board member"),
            Self::EmailTaken => write!(f, "email is already registered"),
        }
    }
}

#[derive(Error, Debug)]
pub enum TaskboardError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(ConflictReason),

    /// A multi-document step failed after an earlier step committed.
    /// Never swallowed; the caller decides whether to resubmit.
    #[error("Dependent write failed: {0}")]
    DependencyWriteFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TaskboardError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{entity} {id}"))
    }
}
