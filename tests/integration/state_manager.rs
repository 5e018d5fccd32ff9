//! Integration tests for the state manager.
//!
//! Drives `StateManager` against `InMemoryGateway` through full create,
//! update, status change and delete flows, including failure injection.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::similar_names,
    clippy::redundant_clone
)]

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use taskflow::gateway::GatewayError;
use taskflow::gateway::memory::{GatewayOp, InMemoryGateway};
use taskflow::session::{CurrentUser, SessionContext};
use taskflow::state::{StateError, StateManager, StatusChange};
use taskflow_proto::{
    NewProject, NewTask, Priority, ProjectColor, ProjectPatch, Status, TaskPatch, UserId,
    ValidationError,
};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

type Manager = StateManager<InMemoryGateway, Arc<SessionContext>>;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn user() -> CurrentUser {
    CurrentUser::new(UserId::new(), "ana@example.com")
}

fn make_manager() -> (Manager, Arc<SessionContext>) {
    let session = Arc::new(SessionContext::signed_in(user()));
    let manager = StateManager::new(InMemoryGateway::new(), Arc::clone(&session));
    (manager, session)
}

fn new_project(name: &str) -> NewProject {
    NewProject::new(name, "", ProjectColor::Azul)
}

// ---------------------------------------------------------------------------
// End-to-end
// ---------------------------------------------------------------------------

#[tokio::test]
async fn launch_scenario() {
    let (manager, _session) = make_manager();

    let project = manager.create_project(new_project("Launch")).await.unwrap();
    assert_eq!(manager.projects()[0].color.hex(), "#3881ec");

    let task = manager
        .create_task(
            NewTask::new("Write copy", project.clone(), date(2025, 3, 1))
                .with_priority(Priority::Alta)
                .with_status(Status::NaFila),
        )
        .await
        .unwrap();
    assert_eq!(manager.tasks().len(), 1);
    assert_eq!(manager.stats().count_status(Status::NaFila), 1);

    let change = manager
        .change_task_status(&task, Status::Concluida, Some("  pronto  ".to_string()))
        .await
        .unwrap();

    let stats = manager.stats();
    assert_eq!(stats.count_status(Status::Concluida), 1);
    assert_eq!(stats.count_status(Status::NaFila), 0);
    assert_eq!(stats.completion_rate(), 100);

    let StatusChange::Recorded(entry) = change else {
        panic!("expected a recorded transition, got {change:?}");
    };
    assert_eq!(entry.previous_status, Some(Status::NaFila));
    assert_eq!(entry.new_status, Status::Concluida);
    assert_eq!(entry.comment.as_deref(), Some("pronto"));

    let history = manager.load_history(&task).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, entry.id);
    assert_eq!(manager.gateway().history_len(), 1);
}

#[tokio::test]
async fn initialize_loads_existing_data() {
    let gateway = Arc::new(InMemoryGateway::new());

    let writer = StateManager::new(Arc::clone(&gateway), SessionContext::signed_in(user()));
    let project = writer.create_project(new_project("Mobile App")).await.unwrap();
    writer
        .create_task(NewTask::new("Configurar ambiente", project, date(2025, 3, 5)))
        .await
        .unwrap();

    let reader = StateManager::new(Arc::clone(&gateway), SessionContext::signed_in(user()));
    assert!(reader.tasks().is_empty());
    reader.initialize().await;
    assert!(!reader.is_loading());
    assert_eq!(reader.projects().len(), 1);
    assert_eq!(reader.tasks().len(), 1);
}

#[tokio::test]
async fn concurrent_sessions_last_write_wins() {
    let gateway = Arc::new(InMemoryGateway::new());
    let first = StateManager::new(Arc::clone(&gateway), SessionContext::signed_in(user()));
    let project = first.create_project(new_project("Shared")).await.unwrap();
    let task = first
        .create_task(NewTask::new("Shared task", project, date(2025, 3, 1)))
        .await
        .unwrap();

    let second = StateManager::new(Arc::clone(&gateway), SessionContext::signed_in(user()));
    second.initialize().await;

    first
        .update_task(&task, TaskPatch { priority: Some(Priority::Baixa), ..TaskPatch::default() })
        .await
        .unwrap();
    second
        .update_task(&task, TaskPatch { priority: Some(Priority::Urgente), ..TaskPatch::default() })
        .await
        .unwrap();

    assert_eq!(gateway.task_row(&task).unwrap().priority, Priority::Urgente);
    // Each session only sees its own write until it reloads.
    assert_eq!(first.task(&task).unwrap().priority, Priority::Baixa);
    first.initialize().await;
    assert_eq!(first.task(&task).unwrap().priority, Priority::Urgente);
}

#[tokio::test]
async fn initialize_survives_partial_failure() {
    let (manager, _session) = make_manager();
    let project = manager.create_project(new_project("P")).await.unwrap();
    manager
        .create_task(NewTask::new("t", project, date(2025, 3, 1)))
        .await
        .unwrap();

    manager.gateway().fail_on(GatewayOp::ListProjects);
    manager.gateway().set_directory_enabled(false);
    manager.initialize().await;

    assert!(manager.projects().is_empty());
    assert_eq!(manager.tasks().len(), 1);
    // Directory refused: the session user is resolved from profiles instead.
    let users = manager.users();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].email, "ana@example.com");
    assert!(!manager.is_loading());
}

// ---------------------------------------------------------------------------
// Cascade and failure handling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_project_cascades_locally() {
    let (manager, _session) = make_manager();
    let p1 = manager.create_project(new_project("P1")).await.unwrap();
    let p2 = manager.create_project(new_project("P2")).await.unwrap();
    manager
        .create_task(NewTask::new("T1", p1.clone(), date(2025, 3, 1)))
        .await
        .unwrap();
    let t2 = manager
        .create_task(NewTask::new("T2", p2.clone(), date(2025, 3, 1)))
        .await
        .unwrap();
    manager.set_selected_project(Some(p1.clone()));

    manager.delete_project(&p1).await.unwrap();

    let tasks = manager.tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, t2);
    let projects = manager.projects();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].id, p2);
    assert_eq!(manager.selected_project(), None);
    assert_eq!(manager.gateway().task_count(), 1);
}

#[tokio::test]
async fn failed_delete_leaves_state_unchanged() {
    let (manager, _session) = make_manager();
    let p = manager.create_project(new_project("P")).await.unwrap();
    manager
        .create_task(NewTask::new("T", p.clone(), date(2025, 3, 1)))
        .await
        .unwrap();
    manager.gateway().fail_on(GatewayOp::DeleteProject);

    let result = manager.delete_project(&p).await;
    assert!(matches!(
        result,
        Err(StateError::Gateway(GatewayError::Network(_)))
    ));
    assert_eq!(manager.projects().len(), 1);
    assert_eq!(manager.tasks().len(), 1);
}

#[tokio::test]
async fn failed_update_is_not_applied() {
    let (manager, _session) = make_manager();
    let p = manager.create_project(new_project("P")).await.unwrap();
    let t = manager
        .create_task(NewTask::new("Original", p, date(2025, 3, 1)))
        .await
        .unwrap();
    manager.gateway().fail_on(GatewayOp::UpdateTask);

    let result = manager
        .update_task(
            &t,
            TaskPatch {
                title: Some("Changed".to_string()),
                ..TaskPatch::default()
            },
        )
        .await;
    assert!(result.is_err());
    assert_eq!(manager.task(&t).unwrap().title, "Original");

    let result = manager.change_task_status(&t, Status::Iniciada, None).await;
    assert!(result.is_err());
    assert_eq!(manager.task(&t).unwrap().status, Status::NaFila);
    assert_eq!(manager.gateway().history_len(), 0);
}

#[tokio::test]
async fn failed_create_leaves_lists_empty() {
    let (manager, _session) = make_manager();
    manager.gateway().fail_on(GatewayOp::CreateProject);
    assert!(manager.create_project(new_project("P")).await.is_err());
    assert!(manager.projects().is_empty());
}

#[tokio::test]
async fn failed_project_update_keeps_local_project() {
    let (manager, _session) = make_manager();
    let p = manager.create_project(new_project("Original")).await.unwrap();
    let before = manager.project(&p).unwrap();
    manager.gateway().fail_on(GatewayOp::UpdateProject);

    let result = manager
        .update_project(
            &p,
            ProjectPatch {
                name: Some("Renamed".to_string()),
                color: Some(ProjectColor::Roxo),
                ..ProjectPatch::default()
            },
        )
        .await;
    assert!(matches!(
        result,
        Err(StateError::Gateway(GatewayError::Network(_)))
    ));
    assert_eq!(manager.project(&p).unwrap(), before);

    manager.gateway().recover(GatewayOp::UpdateProject);
    manager
        .update_project(
            &p,
            ProjectPatch {
                name: Some("Renamed".to_string()),
                ..ProjectPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(manager.project(&p).unwrap().name, "Renamed");
}

#[tokio::test]
async fn failed_task_create_leaves_tasks_empty() {
    let (manager, _session) = make_manager();
    let p = manager.create_project(new_project("P")).await.unwrap();
    manager.gateway().fail_on(GatewayOp::CreateTask);

    let result = manager
        .create_task(NewTask::new("T", p, date(2025, 3, 1)))
        .await;
    assert!(matches!(
        result,
        Err(StateError::Gateway(GatewayError::Network(_)))
    ));
    assert!(manager.tasks().is_empty());
    assert_eq!(manager.gateway().task_count(), 0);
}

#[tokio::test]
async fn failed_task_delete_keeps_task() {
    let (manager, _session) = make_manager();
    let p = manager.create_project(new_project("P")).await.unwrap();
    let t = manager
        .create_task(NewTask::new("T", p, date(2025, 3, 1)))
        .await
        .unwrap();
    manager.gateway().fail_on(GatewayOp::DeleteTask);

    let result = manager.delete_task(&t).await;
    assert!(matches!(
        result,
        Err(StateError::Gateway(GatewayError::Network(_)))
    ));
    assert_eq!(manager.tasks().len(), 1);
    assert_eq!(manager.task(&t).unwrap().title, "T");
    assert_eq!(manager.gateway().task_count(), 1);
}

// ---------------------------------------------------------------------------
// Validation and session gating
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_title_is_rejected_before_persistence() {
    let (manager, _session) = make_manager();
    let p = manager.create_project(new_project("P")).await.unwrap();

    let result = manager
        .create_task(NewTask::new("   ", p, date(2025, 3, 1)))
        .await;
    assert!(matches!(
        result,
        Err(StateError::Validation(ValidationError::TitleEmpty))
    ));
    assert!(manager.tasks().is_empty());
    assert_eq!(manager.gateway().call_count(GatewayOp::CreateTask), 0);
}

#[tokio::test]
async fn empty_name_in_project_patch_is_rejected() {
    let (manager, _session) = make_manager();
    let p = manager.create_project(new_project("P")).await.unwrap();
    let result = manager
        .update_project(
            &p,
            ProjectPatch {
                name: Some(" ".to_string()),
                ..ProjectPatch::default()
            },
        )
        .await;
    assert!(matches!(
        result,
        Err(StateError::Validation(ValidationError::NameEmpty))
    ));
    assert_eq!(manager.project(&p).unwrap().name, "P");
}

#[tokio::test]
async fn update_project_merges_patch() {
    let (manager, _session) = make_manager();
    let p = manager.create_project(new_project("P")).await.unwrap();
    manager
        .update_project(
            &p,
            ProjectPatch {
                color: Some(ProjectColor::Roxo),
                description: Some("Nova descrição".to_string()),
                ..ProjectPatch::default()
            },
        )
        .await
        .unwrap();
    let project = manager.project(&p).unwrap();
    assert_eq!(project.name, "P");
    assert_eq!(project.color, ProjectColor::Roxo);
    assert_eq!(project.description, "Nova descrição");
}

#[tokio::test]
async fn moving_task_to_unknown_project_is_rejected() {
    let (manager, _session) = make_manager();
    let p = manager.create_project(new_project("P")).await.unwrap();
    let t = manager
        .create_task(NewTask::new("T", p, date(2025, 3, 1)))
        .await
        .unwrap();
    let result = manager
        .update_task(
            &t,
            TaskPatch {
                project_id: Some(taskflow_proto::ProjectId::new()),
                ..TaskPatch::default()
            },
        )
        .await;
    assert!(matches!(result, Err(StateError::ProjectNotFound(_))));
    assert_eq!(manager.gateway().call_count(GatewayOp::UpdateTask), 0);
}

#[tokio::test]
async fn signed_out_operations_do_nothing() {
    let (manager, session) = make_manager();
    let p = manager.create_project(new_project("P")).await.unwrap();
    let t = manager
        .create_task(NewTask::new("T", p.clone(), date(2025, 3, 1)))
        .await
        .unwrap();
    session.sign_out();

    assert!(matches!(
        manager.delete_task(&t).await,
        Err(StateError::NoSession)
    ));
    assert!(matches!(
        manager.delete_project(&p).await,
        Err(StateError::NoSession)
    ));
    assert!(matches!(
        manager.change_task_status(&t, Status::Concluida, None).await,
        Err(StateError::NoSession)
    ));
    assert!(matches!(
        manager.load_history(&t).await,
        Err(StateError::NoSession)
    ));
    assert_eq!(manager.gateway().call_count(GatewayOp::DeleteTask), 0);
    assert_eq!(manager.gateway().call_count(GatewayOp::DeleteProject), 0);
    assert_eq!(manager.tasks().len(), 1);
}

// ---------------------------------------------------------------------------
// Status history
// ---------------------------------------------------------------------------

#[tokio::test]
async fn history_accumulates_in_order() {
    let (manager, _session) = make_manager();
    let p = manager.create_project(new_project("P")).await.unwrap();
    let t = manager
        .create_task(NewTask::new("T", p, date(2025, 3, 1)))
        .await
        .unwrap();

    for status in [Status::EmPreparacao, Status::Iniciada, Status::EmRevisao] {
        let change = manager.change_task_status(&t, status, None).await.unwrap();
        assert!(matches!(change, StatusChange::Recorded(_)));
    }

    let history = manager.load_history(&t).await.unwrap();
    let transitions: Vec<(Option<Status>, Status)> = history
        .iter()
        .map(|h| (h.previous_status, h.new_status))
        .collect();
    assert_eq!(
        transitions,
        vec![
            (Some(Status::NaFila), Status::EmPreparacao),
            (Some(Status::EmPreparacao), Status::Iniciada),
            (Some(Status::Iniciada), Status::EmRevisao),
        ]
    );
    assert!(history.windows(2).all(|w| w[0].created_at < w[1].created_at));
}

#[tokio::test]
async fn delete_task_removes_it() {
    let (manager, _session) = make_manager();
    let p = manager.create_project(new_project("P")).await.unwrap();
    let t = manager
        .create_task(NewTask::new("T", p, date(2025, 3, 1)))
        .await
        .unwrap();
    manager.delete_task(&t).await.unwrap();
    assert!(manager.task(&t).is_none());
    assert!(matches!(
        manager.delete_task(&t).await,
        Err(StateError::TaskNotFound(_))
    ));
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn overlapping_operations_both_apply() {
    let session = Arc::new(SessionContext::signed_in(user()));
    let manager = StateManager::new(
        InMemoryGateway::new().with_latency(Duration::from_millis(5)),
        session,
    );
    let p = manager.create_project(new_project("P")).await.unwrap();

    let (a, b) = tokio::join!(
        manager.create_task(NewTask::new("A", p.clone(), date(2025, 3, 1))),
        manager.create_task(NewTask::new("B", p.clone(), date(2025, 3, 2))),
    );
    let a = a.unwrap();
    let b = b.unwrap();

    let (ra, rb) = tokio::join!(
        manager.change_task_status(&a, Status::Iniciada, None),
        manager.change_task_status(&b, Status::Concluida, None),
    );
    assert!(matches!(ra.unwrap(), StatusChange::Recorded(_)));
    assert!(matches!(rb.unwrap(), StatusChange::Recorded(_)));
    assert_eq!(manager.tasks().len(), 2);
    assert_eq!(manager.stats().in_progress(), 1);
    assert_eq!(manager.stats().completed(), 1);
}

#[tokio::test]
async fn cancelled_initialize_clears_loading() {
    let session = Arc::new(SessionContext::signed_in(user()));
    let manager = StateManager::new(
        InMemoryGateway::new().with_latency(Duration::from_millis(200)),
        session,
    );

    let result = tokio::time::timeout(Duration::from_millis(10), manager.initialize()).await;
    assert!(result.is_err());
    assert!(!manager.is_loading());

    manager.initialize().await;
    assert!(!manager.is_loading());
}
