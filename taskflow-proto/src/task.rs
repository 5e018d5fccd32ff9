//! Task model: priority and status enums, task records, create and patch payloads.
//!
//! Priority and status carry a fixed rank that is the only ordering used when
//! sorting. Their serialized form is the exact Portuguese wire string stored
//! in the `tasks` table.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ValidationError};
use crate::ids::{ProjectId, TaskId, UserId};

/// Task severity. Variant order is the rank order (`urgente` = 0).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Priority {
    /// Rank 0.
    #[serde(rename = "urgente")]
    Urgente,
    /// Rank 1.
    #[serde(rename = "alta")]
    Alta,
    /// Rank 2. Default for new tasks.
    #[default]
    #[serde(rename = "média")]
    Media,
    /// Rank 3.
    #[serde(rename = "baixa")]
    Baixa,
}

impl Priority {
    /// Every priority, in rank order.
    pub const ALL: [Self; 4] = [Self::Urgente, Self::Alta, Self::Media, Self::Baixa];

    /// Sorting rank: lower is more severe.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Urgente => 0,
            Self::Alta => 1,
            Self::Media => 2,
            Self::Baixa => 3,
        }
    }

    /// The exact string stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Urgente => "urgente",
            Self::Alta => "alta",
            Self::Media => "média",
            Self::Baixa => "baixa",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ParseError::Priority(s.to_string()))
    }
}

/// Position in the task pipeline. Variant order is the rank order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Status {
    /// Rank 0. Default for new tasks.
    #[default]
    #[serde(rename = "na fila")]
    NaFila,
    /// Rank 1.
    #[serde(rename = "em preparação")]
    EmPreparacao,
    /// Rank 2.
    #[serde(rename = "iniciada")]
    Iniciada,
    /// Rank 3.
    #[serde(rename = "em revisão")]
    EmRevisao,
    /// Rank 4. Terminal state.
    #[serde(rename = "concluída")]
    Concluida,
}

impl Status {
    /// Every status, in pipeline order.
    pub const ALL: [Self; 5] = [
        Self::NaFila,
        Self::EmPreparacao,
        Self::Iniciada,
        Self::EmRevisao,
        Self::Concluida,
    ];

    /// Sorting rank: position in the pipeline.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::NaFila => 0,
            Self::EmPreparacao => 1,
            Self::Iniciada => 2,
            Self::EmRevisao => 3,
            Self::Concluida => 4,
        }
    }

    /// The exact string stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NaFila => "na fila",
            Self::EmPreparacao => "em preparação",
            Self::Iniciada => "iniciada",
            Self::EmRevisao => "em revisão",
            Self::Concluida => "concluída",
        }
    }

    /// Whether work has started but not finished.
    #[must_use]
    pub const fn is_in_progress(self) -> bool {
        matches!(self, Self::EmPreparacao | Self::Iniciada | Self::EmRevisao)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| ParseError::Status(s.to_string()))
    }
}

/// A unit of work inside a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Server-assigned id.
    pub id: TaskId,
    /// Non-empty title.
    pub title: String,
    /// Free text, may be empty.
    pub description: String,
    /// Severity.
    pub priority: Priority,
    /// Pipeline position.
    pub status: Status,
    /// Calendar due date.
    pub due_date: NaiveDate,
    /// Owning project. Always resolves to a live project.
    pub project_id: ProjectId,
    /// Server-assigned creation time.
    pub created_at: DateTime<Utc>,
    /// Creator; never changes after creation.
    pub created_by: UserId,
    /// Current assignee, if any.
    pub assigned_to: Option<UserId>,
}

impl Task {
    /// A task is overdue when its due date has passed and it is not finished.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date < today && self.status != Status::Concluida
    }

    /// Merges the fields present in `patch` into this task.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title.clone_from(title);
        }
        if let Some(description) = &patch.description {
            self.description.clone_from(description);
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

/// Fields for creating a task. The server assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Title; must be non-empty after trimming.
    pub title: String,
    /// Description, may be empty.
    pub description: String,
    /// Severity.
    pub priority: Priority,
    /// Initial status.
    pub status: Status,
    /// Due date.
    pub due_date: NaiveDate,
    /// Owning project.
    pub project_id: ProjectId,
    /// Creator. Filled from the session when `None`.
    pub created_by: Option<UserId>,
    /// Initial assignee.
    pub assigned_to: Option<UserId>,
}

impl NewTask {
    /// Starts a task with the default priority and status.
    #[must_use]
    pub fn new(title: impl Into<String>, project_id: ProjectId, due_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            priority: Priority::default(),
            status: Status::default(),
            due_date,
            project_id,
            created_by: None,
            assigned_to: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the initial status.
    #[must_use]
    pub const fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Sets the assignee.
    #[must_use]
    pub fn assigned_to(mut self, user: UserId) -> Self {
        self.assigned_to = Some(user);
        self
    }

    /// Trims title and description and rejects an empty title.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::TitleEmpty`] if the trimmed title is empty.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        if self.title.is_empty() {
            return Err(ValidationError::TitleEmpty);
        }
        Ok(self)
    }
}

/// Partial update for a task. `None` leaves a field untouched.
///
/// `assigned_to` is doubly optional: `Some(None)` clears the assignee and is
/// serialized as an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskPatch {
    /// New title; must be non-empty after trimming.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New priority.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// New status; a change records a history entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// New due date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Project to move the task to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    /// New assignee, or `Some(None)` to unassign.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Option<UserId>>,
}

impl TaskPatch {
    /// A patch that only moves the task to `status`.
    #[must_use]
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.due_date.is_none()
            && self.project_id.is_none()
            && self.assigned_to.is_none()
    }

    /// Trims text fields and rejects an empty title.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::TitleEmpty`] if a title is present and
    /// empty after trimming.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        if let Some(title) = self.title.as_mut() {
            *title = title.trim().to_string();
            if title.is_empty() {
                return Err(ValidationError::TitleEmpty);
            }
        }
        if let Some(description) = self.description.as_mut() {
            *description = description.trim().to_string();
        }
        Ok(self)
    }
}
