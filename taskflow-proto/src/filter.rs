//! Filter and sort selectors for task views.
//!
//! The "all" sentinels use the same strings as the task list controls:
//! `todos` for status and `todas` for priority.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::task::{Priority, Status};

/// Status selector: every status, or exactly one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    /// Wire value of the "all" sentinel.
    pub const ALL_SENTINEL: &'static str = "todos";

    /// Whether `status` passes this filter.
    #[must_use]
    pub fn matches(self, status: Status) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str(Self::ALL_SENTINEL),
            Self::Only(status) => write!(f, "{status}"),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::ALL_SENTINEL {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

/// Priority selector: every priority, or exactly one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

impl PriorityFilter {
    /// Wire value of the "all" sentinel.
    pub const ALL_SENTINEL: &'static str = "todas";

    /// Whether `priority` passes this filter.
    #[must_use]
    pub fn matches(self, priority: Priority) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == priority,
        }
    }
}

impl std::fmt::Display for PriorityFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str(Self::ALL_SENTINEL),
            Self::Only(priority) => write!(f, "{priority}"),
        }
    }
}

impl FromStr for PriorityFilter {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::ALL_SENTINEL {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

/// The active filter selection for the task list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    /// Status to keep, or all.
    pub status: StatusFilter,
    /// Priority to keep, or all.
    pub priority: PriorityFilter,
    /// Case-insensitive substring matched against title and description.
    pub search: String,
}

impl Filters {
    /// Whether any filter narrows the list.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status != StatusFilter::All
            || self.priority != PriorityFilter::All
            || !self.search.is_empty()
    }
}

/// Which key the task list is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOption {
    /// Most severe first.
    #[default]
    Priority,
    /// Earliest due date first.
    DueDate,
    /// Pipeline order.
    Status,
    /// Alphabetical.
    Title,
    /// Newest first.
    CreatedAt,
}

impl SortOption {
    /// Every option, in menu order.
    pub const ALL: [Self; 5] = [
        Self::Priority,
        Self::DueDate,
        Self::Status,
        Self::Title,
        Self::CreatedAt,
    ];

    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Priority => "priority",
            Self::DueDate => "dueDate",
            Self::Status => "status",
            Self::Title => "title",
            Self::CreatedAt => "createdAt",
        }
    }
}

impl std::fmt::Display for SortOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOption {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| ParseError::SortOption(s.to_string()))
    }
}
