//! In-memory gateway for tests and the offline demo.
//!
//! Keeps the four tables as row vectors behind a [`parking_lot::Mutex`] and
//! behaves like the hosted store: ids are UUID v7, `created_at` is strictly
//! increasing, `tasks.project_id` is a foreign key with `ON DELETE CASCADE`,
//! and lists come back newest first. Individual operations can be made to
//! fail to exercise error paths.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;

use taskflow_proto::row::{
    ProjectInsert, ProjectRow, StatusHistoryInsert, StatusHistoryRow, TaskInsert, TaskRow,
};
use taskflow_proto::{
    AppUser, HistoryId, NewProject, NewStatusHistoryEntry, NewTask, Project, ProjectId,
    ProjectPatch, StatusHistoryEntry, Task, TaskId, TaskPatch, UserId, UserProfile,
};

use super::{Gateway, GatewayError};

/// Identifies one gateway operation, for failure injection and call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    ListProjects,
    CreateProject,
    UpdateProject,
    DeleteProject,
    ListTasks,
    CreateTask,
    UpdateTask,
    DeleteTask,
    ListUsers,
    GetProfile,
    ListHistory,
    AppendHistory,
}

impl GatewayOp {
    /// Every operation.
    pub const ALL: [Self; 12] = [
        Self::ListProjects,
        Self::CreateProject,
        Self::UpdateProject,
        Self::DeleteProject,
        Self::ListTasks,
        Self::CreateTask,
        Self::UpdateTask,
        Self::DeleteTask,
        Self::ListUsers,
        Self::GetProfile,
        Self::ListHistory,
        Self::AppendHistory,
    ];
}

#[derive(Debug, Default)]
struct Tables {
    projects: Vec<ProjectRow>,
    tasks: Vec<TaskRow>,
    history: Vec<StatusHistoryRow>,
    profiles: HashMap<UserId, UserProfile>,
    users: Vec<AppUser>,
    last_created_at: Option<DateTime<Utc>>,
}

impl Tables {
    /// Server clock that never repeats a value.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_created_at {
            Some(last) if now <= last => last + TimeDelta::milliseconds(1),
            _ => now,
        };
        self.last_created_at = Some(ts);
        ts
    }

    fn has_project(&self, id: &ProjectId) -> bool {
        self.projects.iter().any(|p| p.id == *id)
    }

    fn has_task(&self, id: &TaskId) -> bool {
        self.tasks.iter().any(|t| t.id == *id)
    }
}

/// Sorts rows newest first, keeping insertion order among equal timestamps.
fn newest_first<R, T: From<R>>(mut rows: Vec<R>, created_at: impl Fn(&R) -> DateTime<Utc>) -> Vec<T> {
    rows.reverse();
    rows.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    rows.into_iter().map(T::from).collect()
}

/// In-process stand-in for the hosted store.
pub struct InMemoryGateway {
    tables: Mutex<Tables>,
    failing: Mutex<HashSet<GatewayOp>>,
    calls: Mutex<HashMap<GatewayOp, usize>>,
    directory_enabled: AtomicBool,
    latency: Option<Duration>,
}

impl InMemoryGateway {
    /// Create an empty store with the user directory enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(HashMap::new()),
            directory_enabled: AtomicBool::new(true),
            latency: None,
        }
    }

    /// Delay every call by `latency` before it touches the tables.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make `op` fail with a network error until [`recover`](Self::recover).
    pub fn fail_on(&self, op: GatewayOp) {
        self.failing.lock().insert(op);
    }

    /// Make every operation fail.
    pub fn fail_all(&self) {
        self.failing.lock().extend(GatewayOp::ALL);
    }

    /// Stop failing `op`.
    pub fn recover(&self, op: GatewayOp) {
        self.failing.lock().remove(&op);
    }

    /// Stop failing every operation.
    pub fn recover_all(&self) {
        self.failing.lock().clear();
    }

    /// Allow or refuse the privileged user directory call.
    pub fn set_directory_enabled(&self, enabled: bool) {
        self.directory_enabled.store(enabled, Ordering::SeqCst);
    }

    /// How many times `op` has been invoked, including failed attempts.
    #[must_use]
    pub fn call_count(&self, op: GatewayOp) -> usize {
        self.calls.lock().get(&op).copied().unwrap_or(0)
    }

    /// Insert a project row as-is, bypassing the server-assigned columns.
    pub fn seed_project(&self, row: ProjectRow) {
        let mut tables = self.tables.lock();
        tables.last_created_at = tables.last_created_at.max(Some(row.created_at));
        tables.projects.push(row);
    }

    /// Insert a task row as-is. The foreign key is not checked.
    pub fn seed_task(&self, row: TaskRow) {
        let mut tables = self.tables.lock();
        tables.last_created_at = tables.last_created_at.max(Some(row.created_at));
        tables.tasks.push(row);
    }

    /// Register an auth user in the privileged directory.
    pub fn add_user(&self, user: AppUser) {
        self.tables.lock().users.push(user);
    }

    /// Store a profile row.
    pub fn put_profile(&self, profile: UserProfile) {
        self.tables.lock().profiles.insert(profile.id.clone(), profile);
    }

    /// Number of stored projects.
    #[must_use]
    pub fn project_count(&self) -> usize {
        self.tables.lock().projects.len()
    }

    /// Number of stored tasks.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tables.lock().tasks.len()
    }

    /// Number of stored history entries across all tasks.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.tables.lock().history.len()
    }

    /// Stored task row, if any.
    #[must_use]
    pub fn task_row(&self, id: &TaskId) -> Option<TaskRow> {
        self.tables.lock().tasks.iter().find(|t| t.id == *id).cloned()
    }

    /// Records the call, waits out the configured latency and applies
    /// injected failures.
    async fn round_trip(&self, op: GatewayOp) -> Result<(), GatewayError> {
        *self.calls.lock().entry(op).or_insert(0) += 1;
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing.lock().contains(&op) {
            return Err(GatewayError::Network(format!("injected failure: {op:?}")));
        }
        Ok(())
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl Gateway for InMemoryGateway {
    async fn list_projects(&self) -> Result<Vec<Project>, GatewayError> {
        self.round_trip(GatewayOp::ListProjects).await?;
        let rows = self.tables.lock().projects.clone();
        Ok(newest_first(rows, |r: &ProjectRow| r.created_at))
    }

    async fn create_project(&self, project: &NewProject) -> Result<Project, GatewayError> {
        self.round_trip(GatewayOp::CreateProject).await?;
        let mut tables = self.tables.lock();
        let created_at = tables.next_timestamp();
        let row = ProjectInsert::from(project).into_row(ProjectId::new(), created_at);
        tables.projects.push(row.clone());
        Ok(row.into())
    }

    async fn update_project(&self, id: &ProjectId, patch: &ProjectPatch) -> Result<(), GatewayError> {
        self.round_trip(GatewayOp::UpdateProject).await?;
        let mut tables = self.tables.lock();
        let row = tables
            .projects
            .iter_mut()
            .find(|p| p.id == *id)
            .ok_or_else(|| GatewayError::NotFound(format!("project {id}")))?;
        row.apply(patch);
        Ok(())
    }

    async fn delete_project(&self, id: &ProjectId) -> Result<(), GatewayError> {
        self.round_trip(GatewayOp::DeleteProject).await?;
        let mut tables = self.tables.lock();
        if !tables.has_project(id) {
            return Err(GatewayError::NotFound(format!("project {id}")));
        }
        tables.projects.retain(|p| p.id != *id);
        let orphaned: HashSet<TaskId> = tables
            .tasks
            .iter()
            .filter(|t| t.project_id == *id)
            .map(|t| t.id.clone())
            .collect();
        tables.tasks.retain(|t| t.project_id != *id);
        tables.history.retain(|h| !orphaned.contains(&h.task_id));
        Ok(())
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, GatewayError> {
        self.round_trip(GatewayOp::ListTasks).await?;
        let rows = self.tables.lock().tasks.clone();
        Ok(newest_first(rows, |r: &TaskRow| r.created_at))
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task, GatewayError> {
        self.round_trip(GatewayOp::CreateTask).await?;
        let insert = TaskInsert::from_new(task)
            .ok_or_else(|| GatewayError::Constraint("tasks.created_by is required".to_string()))?;
        let mut tables = self.tables.lock();
        if !tables.has_project(&insert.project_id) {
            return Err(GatewayError::Constraint(format!(
                "tasks.project_id references unknown project {}",
                insert.project_id
            )));
        }
        let created_at = tables.next_timestamp();
        let row = insert.into_row(TaskId::new(), created_at);
        tables.tasks.push(row.clone());
        Ok(row.into())
    }

    async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<(), GatewayError> {
        self.round_trip(GatewayOp::UpdateTask).await?;
        let mut tables = self.tables.lock();
        if let Some(project_id) = patch.project_id.as_ref().filter(|p| !tables.has_project(p)) {
            return Err(GatewayError::Constraint(format!(
                "tasks.project_id references unknown project {project_id}"
            )));
        }
        let row = tables
            .tasks
            .iter_mut()
            .find(|t| t.id == *id)
            .ok_or_else(|| GatewayError::NotFound(format!("task {id}")))?;
        row.apply(patch);
        Ok(())
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), GatewayError> {
        self.round_trip(GatewayOp::DeleteTask).await?;
        let mut tables = self.tables.lock();
        if !tables.has_task(id) {
            return Err(GatewayError::NotFound(format!("task {id}")));
        }
        tables.tasks.retain(|t| t.id != *id);
        tables.history.retain(|h| h.task_id != *id);
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<AppUser>, GatewayError> {
        self.round_trip(GatewayOp::ListUsers).await?;
        if !self.directory_enabled.load(Ordering::SeqCst) {
            return Err(GatewayError::Forbidden(
                "user directory requires a privileged role".to_string(),
            ));
        }
        let tables = self.tables.lock();
        let users = tables
            .users
            .iter()
            .map(|user| {
                let mut user = user.clone();
                if let Some(profile) = tables.profiles.get(&user.id) {
                    user.name = profile.display_name.clone().or(user.name);
                    user.avatar_url = profile.avatar_url.clone().or(user.avatar_url);
                }
                user
            })
            .collect();
        Ok(users)
    }

    async fn get_profile(&self, id: &UserId) -> Result<Option<UserProfile>, GatewayError> {
        self.round_trip(GatewayOp::GetProfile).await?;
        Ok(self.tables.lock().profiles.get(id).cloned())
    }

    async fn list_status_history(
        &self,
        task_id: &TaskId,
    ) -> Result<Vec<StatusHistoryEntry>, GatewayError> {
        self.round_trip(GatewayOp::ListHistory).await?;
        let mut rows: Vec<StatusHistoryRow> = self
            .tables
            .lock()
            .history
            .iter()
            .filter(|h| h.task_id == *task_id)
            .cloned()
            .collect();
        rows.sort_by_key(|h| h.created_at);
        Ok(rows.into_iter().map(StatusHistoryEntry::from).collect())
    }

    async fn append_status_history(
        &self,
        entry: &NewStatusHistoryEntry,
    ) -> Result<StatusHistoryEntry, GatewayError> {
        self.round_trip(GatewayOp::AppendHistory).await?;
        let mut tables = self.tables.lock();
        if !tables.has_task(&entry.task_id) {
            return Err(GatewayError::Constraint(format!(
                "task_status_history.task_id references unknown task {}",
                entry.task_id
            )));
        }
        let created_at = tables.next_timestamp();
        let row = StatusHistoryInsert::from(entry).into_row(HistoryId::new(), created_at);
        tables.history.push(row.clone());
        Ok(row.into())
    }
}
