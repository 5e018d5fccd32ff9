//! Append-only record of task status changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::ids::{HistoryId, TaskId, UserId};
use crate::task::Status;

/// Maximum status change comment length in characters.
pub const MAX_COMMENT_LENGTH: usize = 140;

/// One recorded status transition. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    /// Server-assigned id.
    pub id: HistoryId,
    /// Task whose status changed.
    pub task_id: TaskId,
    /// `None` when this is the first recorded status of the task.
    pub previous_status: Option<Status>,
    /// Status after the change.
    pub new_status: Status,
    /// Trimmed comment, at most [`MAX_COMMENT_LENGTH`] characters.
    pub comment: Option<String>,
    /// User who made the change.
    pub changed_by: UserId,
    /// Server-assigned time of the change.
    pub created_at: DateTime<Utc>,
}

impl StatusHistoryEntry {
    /// Whether this entry records the initial status rather than a transition.
    #[must_use]
    pub const fn is_initial(&self) -> bool {
        self.previous_status.is_none()
    }
}

/// Fields for appending a history entry. The server assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStatusHistoryEntry {
    pub task_id: TaskId,
    pub previous_status: Option<Status>,
    pub new_status: Status,
    pub comment: Option<String>,
    pub changed_by: UserId,
}

/// Normalizes a status change comment.
///
/// Trims whitespace and maps an empty comment to `None`.
///
/// # Errors
///
/// Returns [`ValidationError::CommentTooLong`] if the trimmed comment is
/// longer than [`MAX_COMMENT_LENGTH`] characters.
pub fn normalize_comment(comment: Option<String>) -> Result<Option<String>, ValidationError> {
    let Some(comment) = comment else {
        return Ok(None);
    };
    let trimmed = comment.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let len = trimmed.chars().count();
    if len > MAX_COMMENT_LENGTH {
        return Err(ValidationError::CommentTooLong {
            len,
            max: MAX_COMMENT_LENGTH,
        });
    }
    Ok(Some(trimmed.to_string()))
}
