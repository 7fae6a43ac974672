//! Error types for source domain validation.

use thiserror::Error;

/// Errors returned while constructing source domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceDomainError {
    /// The identifier is empty after trimming.
    #[error("source identifier must not be empty")]
    EmptyId,

    /// The priority value is outside the 1–4 range.
    #[error("invalid priority {0}, expected 1..=4")]
    InvalidPriority(u8),
}
