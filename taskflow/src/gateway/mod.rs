//! Persistence gateway abstraction for `TaskFlow`.
//!
//! Defines the [`Gateway`] trait through which the state manager reaches the
//! hosted data store. The store owns id assignment, creation timestamps,
//! row-level security and the `tasks.project_id` foreign key. Implementations:
//! - [`memory::InMemoryGateway`]: in-process tables for tests and the demo
//!
//! Every call may fail; failures come back as a [`GatewayError`] and never
//! as a panic.

pub mod memory;

use std::future::Future;

use taskflow_proto::row::CodecError;
use taskflow_proto::{
    AppUser, NewProject, NewStatusHistoryEntry, NewTask, Project, ProjectId, ProjectPatch,
    StatusHistoryEntry, Task, TaskId, TaskPatch, UserId, UserProfile,
};

/// Errors reported by the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request did not reach the store or the response was lost.
    #[error("network error: {0}")]
    Network(String),

    /// The session token was missing or rejected.
    #[error("not authenticated")]
    Unauthorized,

    /// The caller is authenticated but not allowed to perform this call.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The addressed record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A table constraint rejected the write.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// A request or response body could not be (de)serialized. Raised by
    /// gateways that speak the JSON row format in `taskflow_proto::row`.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Async access to the hosted store.
///
/// List calls return records newest first (`created_at desc`), except
/// [`list_status_history`](Gateway::list_status_history) which is oldest
/// first.
pub trait Gateway: Send + Sync {
    /// Fetch every project visible to the session.
    fn list_projects(&self) -> impl Future<Output = Result<Vec<Project>, GatewayError>> + Send;

    /// Insert a project and return the stored record with its id and timestamp.
    fn create_project(
        &self,
        project: &NewProject,
    ) -> impl Future<Output = Result<Project, GatewayError>> + Send;

    /// Apply a partial update to a project.
    fn update_project(
        &self,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Delete a project. The store cascades to its tasks.
    fn delete_project(&self, id: &ProjectId)
    -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Fetch every task visible to the session.
    fn list_tasks(&self) -> impl Future<Output = Result<Vec<Task>, GatewayError>> + Send;

    /// Insert a task. `task.created_by` must be set.
    fn create_task(&self, task: &NewTask)
    -> impl Future<Output = Result<Task, GatewayError>> + Send;

    /// Apply a partial update to a task.
    fn update_task(
        &self,
        id: &TaskId,
        patch: &TaskPatch,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Delete a task.
    fn delete_task(&self, id: &TaskId) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Privileged single-call user directory. May be refused.
    fn list_users(&self) -> impl Future<Output = Result<Vec<AppUser>, GatewayError>> + Send;

    /// Look up one profile row. `Ok(None)` when the user never saved a profile.
    fn get_profile(
        &self,
        id: &UserId,
    ) -> impl Future<Output = Result<Option<UserProfile>, GatewayError>> + Send;

    /// Status history of one task, oldest first.
    fn list_status_history(
        &self,
        task_id: &TaskId,
    ) -> impl Future<Output = Result<Vec<StatusHistoryEntry>, GatewayError>> + Send;

    /// Append a status history entry.
    fn append_status_history(
        &self,
        entry: &NewStatusHistoryEntry,
    ) -> impl Future<Output = Result<StatusHistoryEntry, GatewayError>> + Send;
}

impl<G: Gateway + ?Sized> Gateway for std::sync::Arc<G> {
    fn list_projects(&self) -> impl Future<Output = Result<Vec<Project>, GatewayError>> + Send {
        (**self).list_projects()
    }

    fn create_project(
        &self,
        project: &NewProject,
    ) -> impl Future<Output = Result<Project, GatewayError>> + Send {
        (**self).create_project(project)
    }

    fn update_project(
        &self,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        (**self).update_project(id, patch)
    }

    fn delete_project(
        &self,
        id: &ProjectId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        (**self).delete_project(id)
    }

    fn list_tasks(&self) -> impl Future<Output = Result<Vec<Task>, GatewayError>> + Send {
        (**self).list_tasks()
    }

    fn create_task(
        &self,
        task: &NewTask,
    ) -> impl Future<Output = Result<Task, GatewayError>> + Send {
        (**self).create_task(task)
    }

    fn update_task(
        &self,
        id: &TaskId,
        patch: &TaskPatch,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send {
        (**self).update_task(id, patch)
    }

    fn delete_task(&self, id: &TaskId) -> impl Future<Output = Result<(), GatewayError>> + Send {
        (**self).delete_task(id)
    }

    fn list_users(&self) -> impl Future<Output = Result<Vec<AppUser>, GatewayError>> + Send {
        (**self).list_users()
    }

    fn get_profile(
        &self,
        id: &UserId,
    ) -> impl Future<Output = Result<Option<UserProfile>, GatewayError>> + Send {
        (**self).get_profile(id)
    }

    fn list_status_history(
        &self,
        task_id: &TaskId,
    ) -> impl Future<Output = Result<Vec<StatusHistoryEntry>, GatewayError>> + Send {
        (**self).list_status_history(task_id)
    }

    fn append_status_history(
        &self,
        entry: &NewStatusHistoryEntry,
    ) -> impl Future<Output = Result<StatusHistoryEntry, GatewayError>> + Send {
        (**self).append_status_history(entry)
    }
}
