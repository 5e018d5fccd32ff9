//! Table row shapes and their JSON codec.
//!
//! Rows mirror the columns of the hosted store exactly (snake_case names,
//! nullable `description`). Domain types are produced from rows with a null
//! description mapped to an empty string. Insert bodies omit the columns the
//! server fills in (`id`, `created_at`).
//!
//! [`encode`] and [`decode`] produce and parse the request and response
//! bodies a hosted gateway exchanges with the store.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::history::{NewStatusHistoryEntry, StatusHistoryEntry};
use crate::ids::{HistoryId, ProjectId, TaskId, UserId};
use crate::project::{NewProject, Project, ProjectColor, ProjectPatch};
use crate::task::{NewTask, Priority, Status, Task, TaskPatch};

/// Error type for row encode/decode operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Serialization failed.
    #[error("encode error: {0}")]
    Encode(String),
    /// The payload did not match the expected row shape.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Encodes a row (or list of rows) as a JSON body.
///
/// # Errors
///
/// Returns `CodecError::Encode` if the value cannot be serialized.
pub fn encode<T: Serialize>(value: &T) -> Result<String, CodecError> {
    serde_json::to_string(value).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Decodes a JSON body into a row (or list of rows).
///
/// # Errors
///
/// Returns `CodecError::Decode` if the body is not valid JSON of the
/// expected shape, including unknown enum wire values.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, CodecError> {
    serde_json::from_str(body).map_err(|e| CodecError::Decode(e.to_string()))
}

/// A row of the `projects` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRow {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub color: ProjectColor,
    pub created_at: DateTime<Utc>,
}

impl ProjectRow {
    /// Applies an update body to the stored row.
    pub fn apply(&mut self, patch: &ProjectPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
    }
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description.unwrap_or_default(),
            color: row.color,
            created_at: row.created_at,
        }
    }
}

/// Insert body for the `projects` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInsert {
    pub name: String,
    pub description: Option<String>,
    pub color: ProjectColor,
}

impl From<&NewProject> for ProjectInsert {
    fn from(project: &NewProject) -> Self {
        Self {
            name: project.name.clone(),
            description: Some(project.description.clone()),
            color: project.color,
        }
    }
}

impl ProjectInsert {
    /// Completes the insert with server-assigned columns.
    #[must_use]
    pub fn into_row(self, id: ProjectId, created_at: DateTime<Utc>) -> ProjectRow {
        ProjectRow {
            id,
            name: self.name,
            description: self.description,
            color: self.color,
            created_at,
        }
    }
}

/// A row of the `tasks` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRow {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: NaiveDate,
    pub status: Status,
    pub project_id: ProjectId,
    pub created_at: DateTime<Utc>,
    pub created_by: UserId,
    pub assigned_to: Option<UserId>,
}

impl TaskRow {
    /// Applies an update body to the stored row.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(project_id) = &patch.project_id {
            self.project_id = project_id.clone();
        }
        if let Some(assigned_to) = &patch.assigned_to {
            self.assigned_to.clone_from(assigned_to);
        }
    }
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description.unwrap_or_default(),
            priority: row.priority,
            status: row.status,
            due_date: row.due_date,
            project_id: row.project_id,
            created_at: row.created_at,
            created_by: row.created_by,
            assigned_to: row.assigned_to,
        }
    }
}

/// Insert body for the `tasks` table. `created_by` is mandatory here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInsert {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: NaiveDate,
    pub status: Status,
    pub project_id: ProjectId,
    pub created_by: UserId,
    pub assigned_to: Option<UserId>,
}

impl TaskInsert {
    /// Builds an insert body, or `None` if the creator is not known yet.
    #[must_use]
    pub fn from_new(task: &NewTask) -> Option<Self> {
        Some(Self {
            title: task.title.clone(),
            description: Some(task.description.clone()),
            priority: task.priority,
            due_date: task.due_date,
            status: task.status,
            project_id: task.project_id.clone(),
            created_by: task.created_by.clone()?,
            assigned_to: task.assigned_to.clone(),
        })
    }

    /// Completes the insert with server-assigned columns.
    #[must_use]
    pub fn into_row(self, id: TaskId, created_at: DateTime<Utc>) -> TaskRow {
        TaskRow {
            id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            due_date: self.due_date,
            status: self.status,
            project_id: self.project_id,
            created_at,
            created_by: self.created_by,
            assigned_to: self.assigned_to,
        }
    }
}

/// A row of the `task_status_history` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryRow {
    pub id: HistoryId,
    pub task_id: TaskId,
    pub previous_status: Option<Status>,
    pub new_status: Status,
    pub comment: Option<String>,
    pub changed_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl From<StatusHistoryRow> for StatusHistoryEntry {
    fn from(row: StatusHistoryRow) -> Self {
        Self {
            id: row.id,
            task_id: row.task_id,
            previous_status: row.previous_status,
            new_status: row.new_status,
            comment: row.comment,
            changed_by: row.changed_by,
            created_at: row.created_at,
        }
    }
}

/// Insert body for the `task_status_history` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryInsert {
    pub task_id: TaskId,
    pub previous_status: Option<Status>,
    pub new_status: Status,
    pub comment: Option<String>,
    pub changed_by: UserId,
}

impl From<&NewStatusHistoryEntry> for StatusHistoryInsert {
    fn from(entry: &NewStatusHistoryEntry) -> Self {
        Self {
            task_id: entry.task_id.clone(),
            previous_status: entry.previous_status,
            new_status: entry.new_status,
            comment: entry.comment.clone(),
            changed_by: entry.changed_by.clone(),
        }
    }
}

impl StatusHistoryInsert {
    /// Completes the insert with server-assigned columns.
    #[must_use]
    pub fn into_row(self, id: HistoryId, created_at: DateTime<Utc>) -> StatusHistoryRow {
        StatusHistoryRow {
            id,
            task_id: self.task_id,
            previous_status: self.previous_status,
            new_status: self.new_status,
            comment: self.comment,
            changed_by: self.changed_by,
            created_at,
        }
    }
}
