//! State manager for project and task CRUD against the persistence gateway.
//!
//! Every mutation is confirmed by the store before it is mirrored locally,
//! and each local mutation happens inside a single write-lock section. The
//! lock is never held across an `.await`, so operations may overlap; when
//! two of them touch the same record the later response wins.

use futures_util::join;
use parking_lot::RwLock;
use taskflow_proto::history::normalize_comment;
use taskflow_proto::{
    AppUser, Filters, NewProject, NewStatusHistoryEntry, NewTask, Project, ProjectId,
    ProjectPatch, SortOption, Status, StatusHistoryEntry, Task, TaskId, TaskPatch, UserId,
};

use super::{StateError, StatusChange};
use crate::directory;
use crate::gateway::Gateway;
use crate::session::{CurrentUser, SessionProvider};
use crate::view::{TaskStats, derive_stats, derive_view};

#[derive(Debug, Default)]
struct State {
    projects: Vec<Project>,
    /// Newest first.
    tasks: Vec<Task>,
    users: Vec<AppUser>,
    selected_project: Option<ProjectId>,
    filters: Filters,
    sort_by: SortOption,
    loading: bool,
}

impl State {
    fn has_project(&self, id: &ProjectId) -> bool {
        self.projects.iter().any(|p| p.id == *id)
    }

    fn task_status(&self, id: &TaskId) -> Option<Status> {
        self.tasks.iter().find(|t| t.id == *id).map(|t| t.status)
    }
}

/// Clears the loading flag on drop, so a cancelled load never leaves it set.
struct LoadingGuard<'a>(&'a RwLock<State>);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.write().loading = false;
    }
}

/// Holds the loaded projects, tasks and users for one session.
///
/// The gateway and session provider are injected at construction. All
/// operations take `&self`.
pub struct StateManager<G, S> {
    gateway: G,
    session: S,
    state: RwLock<State>,
}

impl<G: Gateway, S: SessionProvider> StateManager<G, S> {
    /// Creates an empty manager. Call [`initialize`](Self::initialize) to load.
    #[must_use]
    pub fn new(gateway: G, session: S) -> Self {
        Self {
            gateway,
            session,
            state: RwLock::new(State::default()),
        }
    }

    /// Sets the initial sort order.
    #[must_use]
    pub fn with_sort_by(mut self, sort_by: SortOption) -> Self {
        self.state.get_mut().sort_by = sort_by;
        self
    }

    /// The injected gateway.
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// The injected session provider.
    pub const fn session(&self) -> &S {
        &self.session
    }

    fn require_session(&self, operation: &'static str) -> Result<CurrentUser, StateError> {
        self.session.current_user().ok_or_else(|| {
            tracing::debug!(operation, "no active session, ignoring");
            StateError::NoSession
        })
    }

    /// Loads projects, tasks and users for the signed-in user.
    ///
    /// The three reads run concurrently. A failed read is logged and leaves
    /// its collection empty; the others still load. Without a session this
    /// does nothing.
    pub async fn initialize(&self) {
        let Some(user) = self.session.current_user() else {
            tracing::debug!("no active session, skipping initial load");
            return;
        };
        self.state.write().loading = true;
        let _loading = LoadingGuard(&self.state);

        let (projects, tasks, users) = join!(
            self.gateway.list_projects(),
            self.gateway.list_tasks(),
            self.gateway.list_users(),
        );

        let projects = projects.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "failed to load projects");
            Vec::new()
        });
        let tasks = tasks.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "failed to load tasks");
            Vec::new()
        });
        let users = match users {
            Ok(users) => users,
            Err(err) => {
                tracing::debug!(error = %err, "user directory unavailable, resolving from profiles");
                directory::resolve_from_profiles(&self.gateway, &user, &tasks).await
            }
        };

        tracing::info!(
            projects = projects.len(),
            tasks = tasks.len(),
            users = users.len(),
            "state loaded"
        );

        let mut state = self.state.write();
        state.projects = projects;
        state.tasks = tasks;
        state.users = users;
    }

    /// Re-resolves the user directory against the currently loaded tasks.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::NoSession`] without a session.
    pub async fn refresh_users(&self) -> Result<(), StateError> {
        let user = self.require_session("refresh_users")?;
        let tasks = self.state.read().tasks.clone();
        let users = directory::resolve_users(&self.gateway, &user, &tasks).await;
        self.state.write().users = users;
        Ok(())
    }

    /// Creates a project and prepends it to the project list.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Validation`] if the trimmed name is empty, or
    /// [`StateError::Gateway`] if the store rejects the insert.
    pub async fn create_project(&self, project: NewProject) -> Result<ProjectId, StateError> {
        self.require_session("create_project")?;
        let project = project.validate()?;

        let created = self
            .gateway
            .create_project(&project)
            .await
            .inspect_err(|err| {
                tracing::warn!(name = %project.name, error = %err, "failed to create project");
            })?;

        let id = created.id.clone();
        self.state.write().projects.insert(0, created);
        tracing::info!(project_id = %id, "project created");
        Ok(id)
    }

    /// Updates a project once the store confirms the change.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::ProjectNotFound`] for an id that is not loaded,
    /// [`StateError::Validation`] for an empty name, or
    /// [`StateError::Gateway`] if the store rejects the update.
    pub async fn update_project(&self, id: &ProjectId, patch: ProjectPatch) -> Result<(), StateError> {
        self.require_session("update_project")?;
        let exists = self.state.read().has_project(id);
        if !exists {
            return Err(StateError::ProjectNotFound(id.clone()));
        }
        let patch = patch.validate()?;

        self.gateway
            .update_project(id, &patch)
            .await
            .inspect_err(|err| {
                tracing::warn!(project_id = %id, error = %err, "failed to update project");
            })?;

        let mut state = self.state.write();
        if let Some(project) = state.projects.iter_mut().find(|p| p.id == *id) {
            project.apply(&patch);
        }
        drop(state);
        tracing::info!(project_id = %id, "project updated");
        Ok(())
    }

    /// Deletes a project and every task in it.
    ///
    /// Clears the project selection if it pointed at this project.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::ProjectNotFound`] for an id that is not loaded,
    /// or [`StateError::Gateway`] if the store rejects the delete.
    pub async fn delete_project(&self, id: &ProjectId) -> Result<(), StateError> {
        self.require_session("delete_project")?;
        let exists = self.state.read().has_project(id);
        if !exists {
            return Err(StateError::ProjectNotFound(id.clone()));
        }

        self.gateway.delete_project(id).await.inspect_err(|err| {
            tracing::warn!(project_id = %id, error = %err, "failed to delete project");
        })?;

        let mut state = self.state.write();
        state.projects.retain(|p| p.id != *id);
        let before = state.tasks.len();
        state.tasks.retain(|t| t.project_id != *id);
        let removed_tasks = before - state.tasks.len();
        if state.selected_project.as_ref() == Some(id) {
            state.selected_project = None;
        }
        drop(state);
        tracing::info!(project_id = %id, removed_tasks, "project deleted");
        Ok(())
    }

    /// Creates a task and prepends it to the task list.
    ///
    /// The creator defaults to the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Validation`] for an empty title,
    /// [`StateError::ProjectNotFound`] if the project is not loaded, or
    /// [`StateError::Gateway`] if the store rejects the insert.
    pub async fn create_task(&self, task: NewTask) -> Result<TaskId, StateError> {
        let user = self.require_session("create_task")?;
        let mut task = task.validate()?;
        let project_exists = self.state.read().has_project(&task.project_id);
        if !project_exists {
            return Err(StateError::ProjectNotFound(task.project_id));
        }
        if task.created_by.is_none() {
            task.created_by = Some(user.id);
        }

        let created = self.gateway.create_task(&task).await.inspect_err(|err| {
            tracing::warn!(
                project_id = %task.project_id,
                title = %task.title,
                error = %err,
                "failed to create task"
            );
        })?;

        let id = created.id.clone();
        self.state.write().tasks.insert(0, created);
        tracing::info!(task_id = %id, project_id = %task.project_id, "task created");
        Ok(id)
    }

    /// Updates a task once the store confirms the change.
    ///
    /// When the patch moves the task to a different status the transition
    /// is recorded without a comment, and the outcome of that is returned.
    /// Otherwise the result is [`StatusChange::Unchanged`].
    ///
    /// # Errors
    ///
    /// Returns [`StateError::TaskNotFound`] for an id that is not loaded,
    /// [`StateError::ProjectNotFound`] when moving to a project that is not
    /// loaded, [`StateError::Validation`] for an empty title, or
    /// [`StateError::Gateway`] if the store rejects the update.
    pub async fn update_task(&self, id: &TaskId, patch: TaskPatch) -> Result<StatusChange, StateError> {
        let user = self.require_session("update_task")?;
        let patch = patch.validate()?;
        let (previous, target_exists) = {
            let state = self.state.read();
            let target_exists = patch
                .project_id
                .as_ref()
                .is_none_or(|p| state.has_project(p));
            (state.task_status(id), target_exists)
        };
        let Some(previous) = previous else {
            return Err(StateError::TaskNotFound(id.clone()));
        };
        if let Some(project_id) = patch.project_id.as_ref().filter(|_| !target_exists) {
            return Err(StateError::ProjectNotFound(project_id.clone()));
        }
        if patch.is_empty() {
            tracing::debug!(task_id = %id, "empty task patch, nothing to send");
            return Ok(StatusChange::Unchanged);
        }

        self.gateway.update_task(id, &patch).await.inspect_err(|err| {
            tracing::warn!(task_id = %id, error = %err, "failed to update task");
        })?;

        self.apply_task_patch(id, &patch);
        tracing::info!(task_id = %id, "task updated");

        match patch.status.filter(|s| *s != previous) {
            Some(status) => Ok(self
                .record_status_change(&user, id, previous, status, None)
                .await),
            None => Ok(StatusChange::Unchanged),
        }
    }

    /// Moves a task to `status` and records the transition.
    ///
    /// The comment is trimmed and dropped when blank. Moving a task to the
    /// status it already has sends nothing and returns
    /// [`StatusChange::Unchanged`]. If the status update succeeds but the
    /// history entry cannot be stored, the new status stays applied and the
    /// result is [`StatusChange::HistoryNotRecorded`].
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Validation`] for a comment over 140 characters,
    /// [`StateError::TaskNotFound`] for an id that is not loaded, or
    /// [`StateError::Gateway`] if the store rejects the status update.
    pub async fn change_task_status(
        &self,
        id: &TaskId,
        status: Status,
        comment: Option<String>,
    ) -> Result<StatusChange, StateError> {
        let user = self.require_session("change_task_status")?;
        let comment = normalize_comment(comment)?;
        let previous = self.state.read().task_status(id);
        let Some(previous) = previous else {
            return Err(StateError::TaskNotFound(id.clone()));
        };
        if previous == status {
            tracing::debug!(task_id = %id, %status, "status unchanged");
            return Ok(StatusChange::Unchanged);
        }

        let patch = TaskPatch::status(status);
        self.gateway.update_task(id, &patch).await.inspect_err(|err| {
            tracing::warn!(task_id = %id, %status, error = %err, "failed to change task status");
        })?;

        self.apply_task_patch(id, &patch);
        Ok(self
            .record_status_change(&user, id, previous, status, comment)
            .await)
    }

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::TaskNotFound`] for an id that is not loaded, or
    /// [`StateError::Gateway`] if the store rejects the delete.
    pub async fn delete_task(&self, id: &TaskId) -> Result<(), StateError> {
        self.require_session("delete_task")?;
        let exists = self.state.read().task_status(id).is_some();
        if !exists {
            return Err(StateError::TaskNotFound(id.clone()));
        }

        self.gateway.delete_task(id).await.inspect_err(|err| {
            tracing::warn!(task_id = %id, error = %err, "failed to delete task");
        })?;

        self.state.write().tasks.retain(|t| t.id != *id);
        tracing::info!(task_id = %id, "task deleted");
        Ok(())
    }

    /// Fetches the status history of a task, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::NoSession`] without a session, or
    /// [`StateError::Gateway`] if the read fails.
    pub async fn load_history(&self, id: &TaskId) -> Result<Vec<StatusHistoryEntry>, StateError> {
        self.require_session("load_history")?;
        let mut history = self
            .gateway
            .list_status_history(id)
            .await
            .inspect_err(|err| {
                tracing::warn!(task_id = %id, error = %err, "failed to load status history");
            })?;
        history.sort_by_key(|entry| entry.created_at);
        Ok(history)
    }

    fn apply_task_patch(&self, id: &TaskId, patch: &TaskPatch) {
        let mut state = self.state.write();
        if let Some(task) = state.tasks.iter_mut().find(|t| t.id == *id) {
            task.apply(patch);
        }
    }

    async fn record_status_change(
        &self,
        user: &CurrentUser,
        task_id: &TaskId,
        previous: Status,
        status: Status,
        comment: Option<String>,
    ) -> StatusChange {
        let entry = NewStatusHistoryEntry {
            task_id: task_id.clone(),
            previous_status: Some(previous),
            new_status: status,
            comment,
            changed_by: user.id.clone(),
        };
        match self.gateway.append_status_history(&entry).await {
            Ok(recorded) => {
                tracing::info!(task_id = %task_id, from = %previous, to = %status, "status changed");
                StatusChange::Recorded(recorded)
            }
            Err(err) => {
                tracing::warn!(
                    task_id = %task_id,
                    from = %previous,
                    to = %status,
                    error = %err,
                    "status changed but history entry was not recorded"
                );
                StatusChange::HistoryNotRecorded
            }
        }
    }

    /// Scopes the view and stats to `project`, or to every project.
    pub fn set_selected_project(&self, project: Option<ProjectId>) {
        self.state.write().selected_project = project;
    }

    /// Replaces the active filters.
    pub fn set_filters(&self, filters: Filters) {
        self.state.write().filters = filters;
    }

    /// Changes the sort order of the view.
    pub fn set_sort_by(&self, sort_by: SortOption) {
        self.state.write().sort_by = sort_by;
    }

    /// Resets status, priority and search filters.
    pub fn clear_filters(&self) {
        self.state.write().filters = Filters::default();
    }

    /// Loaded projects, newest first.
    #[must_use]
    pub fn projects(&self) -> Vec<Project> {
        self.state.read().projects.clone()
    }

    /// Loaded tasks, newest first.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.state.read().tasks.clone()
    }

    #[must_use]
    pub fn users(&self) -> Vec<AppUser> {
        self.state.read().users.clone()
    }

    #[must_use]
    pub fn project(&self, id: &ProjectId) -> Option<Project> {
        self.state.read().projects.iter().find(|p| p.id == *id).cloned()
    }

    #[must_use]
    pub fn task(&self, id: &TaskId) -> Option<Task> {
        self.state.read().tasks.iter().find(|t| t.id == *id).cloned()
    }

    #[must_use]
    pub fn user(&self, id: &UserId) -> Option<AppUser> {
        self.state.read().users.iter().find(|u| u.id == *id).cloned()
    }

    #[must_use]
    pub fn selected_project(&self) -> Option<ProjectId> {
        self.state.read().selected_project.clone()
    }

    #[must_use]
    pub fn filters(&self) -> Filters {
        self.state.read().filters.clone()
    }

    #[must_use]
    pub fn sort_by(&self) -> SortOption {
        self.state.read().sort_by
    }

    /// Whether [`initialize`](Self::initialize) is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    /// Tasks after applying the current selection, filters and sort order.
    #[must_use]
    pub fn filtered_tasks(&self) -> Vec<Task> {
        let state = self.state.read();
        derive_view(
            &state.tasks,
            state.selected_project.as_ref(),
            &state.filters,
            state.sort_by,
        )
    }

    /// Counts for the selected project, or for everything.
    #[must_use]
    pub fn stats(&self) -> TaskStats {
        let state = self.state.read();
        derive_stats(&state.tasks, state.selected_project.as_ref())
    }
}
