//! Error types for store operations.
//!
//! Expected misses (unknown id, unknown user, repeated spam flag) are not
//! errors: they surface as `bool`, `Option`, or `SpamOutcome` values.

use crate::issue::IssueId;

/// Errors raised at the store boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Required input missing or malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An ingested issue reused an id already present in the registry.
    #[error("issue already exists: {0}")]
    DuplicateIssueId(IssueId),

    /// The acting user is banned and bans are enforced.
    #[error("user is banned: {0}")]
    Banned(String),

    /// The acting user lacks the role required for the action.
    #[error("{username} is not permitted to {action}")]
    Forbidden {
        username: String,
        action: &'static str,
    },
}
