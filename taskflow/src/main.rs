//! `TaskFlow` — offline demo of the task tracker core.
//!
//! Seeds an in-memory store with sample projects and tasks, loads them
//! through the state manager and prints the filtered view plus summary
//! statistics. Configuration via CLI flags, environment variables, or
//! config file (`~/.config/taskflow/config.toml`).
//!
//! ```bash
//! cargo run --bin taskflow
//!
//! # Only urgent tasks of one project, newest first
//! cargo run --bin taskflow -- --project "Website Redesign" \
//!     --priority urgente --sort createdAt
//! ```

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use chrono::Local;
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;

use taskflow::config::{CliArgs, ClientConfig};
use taskflow::demo;
use taskflow::gateway::memory::InMemoryGateway;
use taskflow::session::SessionContext;
use taskflow::state::StateManager;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::default()
        }
    };

    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!("taskflow starting");

    let user = config.current_user();
    let session = Arc::new(SessionContext::signed_in(user.clone()));
    let gateway = InMemoryGateway::new();
    demo::seed(&gateway, &user);

    let manager = StateManager::new(gateway, Arc::clone(&session)).with_sort_by(config.sort_by);
    manager.initialize().await;

    if let Some(name) = &config.project {
        let wanted = name.trim().to_lowercase();
        match manager
            .projects()
            .into_iter()
            .find(|p| p.name.to_lowercase() == wanted)
        {
            Some(project) => manager.set_selected_project(Some(project.id)),
            None => {
                tracing::warn!(project = %name, "unknown project, showing all");
                eprintln!("Warning: no project named {name:?}, showing all projects");
            }
        }
    }
    manager.set_filters(config.filters.clone());

    let today = Local::now().date_naive();
    let mut stdout = io::stdout().lock();
    demo::render_tasks(
        &mut stdout,
        &manager.filtered_tasks(),
        &manager.projects(),
        &manager.users(),
        today,
    )?;
    writeln!(stdout)?;
    demo::render_stats(&mut stdout, &manager.stats())?;

    tracing::info!("taskflow exiting");
    Ok(())
}

/// Initialize logging.
///
/// Logs go to stderr, or to `file_path` when given. Returns a
/// [`WorkerGuard`] that must be held until shutdown to ensure all buffered
/// log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let Some(log_path) = file_path else {
        let (non_blocking, guard) = tracing_appender::non_blocking(io::stderr());
        tracing_subscriber::fmt()
            .with_writer(non_blocking)
            .with_env_filter(env_filter)
            .init();
        return Some(guard);
    };

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}
