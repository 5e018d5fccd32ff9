//! Canonical task and project state.
//!
//! [`StateManager`] owns the loaded projects, tasks and users, applies every
//! mutation against the persistence gateway first and mirrors it locally
//! once the store has confirmed it.

pub mod manager;

pub use manager::StateManager;

use taskflow_proto::{ProjectId, StatusHistoryEntry, TaskId, ValidationError};
use thiserror::Error;

use crate::gateway::GatewayError;

/// Errors returned by state manager operations.
#[derive(Debug, Error)]
pub enum StateError {
    /// Nobody is signed in.
    #[error("no active session")]
    NoSession,
    /// The payload was rejected before reaching the store.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The store rejected or failed the call.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
    /// No loaded project has this id.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),
    /// No loaded task has this id.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
}

/// Outcome of a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
    /// The task moved and the transition was recorded.
    Recorded(StatusHistoryEntry),
    /// The task already had the requested status. Nothing was sent.
    Unchanged,
    /// The task moved but the history entry could not be stored.
    HistoryNotRecorded,
}
