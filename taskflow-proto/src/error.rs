//! Parse and validation errors shared by the domain types.

use thiserror::Error;

/// A wire string did not name a known value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Not one of `urgente`, `alta`, `média`, `baixa`.
    #[error("unknown priority: {0:?}")]
    Priority(String),
    /// Not one of the five pipeline statuses.
    #[error("unknown status: {0:?}")]
    Status(String),
    /// Not a palette color.
    #[error("color {0:?} is not in the project palette")]
    Color(String),
    /// Not a sort option.
    #[error("unknown sort option: {0:?}")]
    SortOption(String),
}

/// A create or update payload failed field validation.
///
/// These are raised before any call to the persistence layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Project name is empty after trimming.
    #[error("project name cannot be empty")]
    NameEmpty,
    /// Task title is empty after trimming.
    #[error("task title cannot be empty")]
    TitleEmpty,
    /// Status change comment exceeds the maximum length.
    #[error("comment too long: {len} characters (max {max})")]
    CommentTooLong {
        /// Actual length in characters.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },
}
