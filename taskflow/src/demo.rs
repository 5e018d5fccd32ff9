//! Sample data and plain-text rendering for the `taskflow` binary.

use std::io::{self, Write};

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use taskflow_proto::row::{ProjectRow, TaskRow};
use taskflow_proto::{AppUser, Priority, Project, ProjectColor, ProjectId, Status, Task, TaskId, UserId};

use crate::avatar::display_name;
use crate::gateway::memory::InMemoryGateway;
use crate::session::CurrentUser;
use crate::view::TaskStats;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Seeds `gateway` with two projects, three tasks, the signed-in user and
/// one teammate.
pub fn seed(gateway: &InMemoryGateway, owner: &CurrentUser) {
    let now = Utc::now();
    let ago = |minutes: i64| -> DateTime<Utc> { now - TimeDelta::minutes(minutes) };

    let website = ProjectId::new();
    let mobile = ProjectId::new();
    gateway.seed_project(ProjectRow {
        id: website.clone(),
        name: "Website Redesign".to_string(),
        description: Some("Redesign do site institucional".to_string()),
        color: ProjectColor::Azul,
        created_at: ago(60),
    });
    gateway.seed_project(ProjectRow {
        id: mobile.clone(),
        name: "Mobile App".to_string(),
        description: Some("Desenvolvimento do aplicativo mobile".to_string()),
        color: ProjectColor::Verde,
        created_at: ago(50),
    });

    let teammate = UserId::new();
    gateway.add_user(AppUser {
        id: owner.id.clone(),
        email: owner.email.clone(),
        name: None,
        avatar_url: None,
    });
    gateway.add_user(AppUser {
        id: teammate.clone(),
        email: "bruno@taskflow.local".to_string(),
        name: Some("Bruno Lima".to_string()),
        avatar_url: None,
    });

    let tasks = [
        (
            "Definir paleta de cores",
            "Escolher as cores principais do novo site",
            Priority::Alta,
            Status::Concluida,
            date(2025, 2, 25),
            &website,
            None,
            40,
        ),
        (
            "Criar wireframes",
            "Wireframes das páginas principais",
            Priority::Urgente,
            Status::Iniciada,
            date(2025, 2, 28),
            &website,
            Some(teammate),
            30,
        ),
        (
            "Configurar ambiente",
            "Preparar o ambiente de desenvolvimento com emulador",
            Priority::Media,
            Status::NaFila,
            date(2025, 3, 5),
            &mobile,
            Some(owner.id.clone()),
            20,
        ),
    ];
    for (title, description, priority, status, due_date, project_id, assigned_to, minutes) in tasks
    {
        gateway.seed_task(TaskRow {
            id: TaskId::new(),
            title: title.to_string(),
            description: Some(description.to_string()),
            priority,
            due_date,
            status,
            project_id: project_id.clone(),
            created_at: ago(minutes),
            created_by: owner.id.clone(),
            assigned_to,
        });
    }
}

/// Writes one line per task, flagging overdue ones.
///
/// # Errors
///
/// Returns any error from `out`.
pub fn render_tasks(
    out: &mut impl Write,
    tasks: &[Task],
    projects: &[Project],
    users: &[AppUser],
    today: NaiveDate,
) -> io::Result<()> {
    if tasks.is_empty() {
        return writeln!(out, "(no tasks)");
    }
    for task in tasks {
        let project = projects
            .iter()
            .find(|p| p.id == task.project_id)
            .map_or("?", |p| p.name.as_str());
        let assignee = task
            .assigned_to
            .as_ref()
            .and_then(|id| users.iter().find(|u| u.id == *id))
            .map(display_name);
        write!(
            out,
            "[{:<7}] {:<28} {:<14} due {} | {}",
            task.priority.as_str(),
            task.title,
            task.status.as_str(),
            task.due_date,
            project
        )?;
        if let Some(assignee) = assignee {
            write!(out, " | @{assignee}")?;
        }
        if task.is_overdue(today) {
            write!(out, " | OVERDUE")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Writes the totals, completion rate and per-status breakdown.
///
/// # Errors
///
/// Returns any error from `out`.
pub fn render_stats(out: &mut impl Write, stats: &TaskStats) -> io::Result<()> {
    writeln!(
        out,
        "{} tasks | {} completed | {} in progress | {}% complete",
        stats.total,
        stats.completed(),
        stats.in_progress(),
        stats.completion_rate()
    )?;
    let by_status: Vec<String> = stats
        .by_status
        .iter()
        .map(|(status, count)| format!("{status}: {count}"))
        .collect();
    writeln!(out, "{}", by_status.join(", "))
}
