//! Configuration system for the `TaskFlow` client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/taskflow/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;

use taskflow_proto::{Filters, PriorityFilter, SortOption, StatusFilter, UserId};

use crate::avatar::AvatarConfig;
use crate::session::CurrentUser;

/// Email used when no identity is configured.
pub const DEFAULT_EMAIL: &str = "demo@taskflow.local";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// A setting parsed as TOML but its value is not acceptable.
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        /// Dotted key, e.g. `view.default_sort`.
        key: &'static str,
        value: String,
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    session: SessionFileConfig,
    view: ViewFileConfig,
    avatar: AvatarFileConfig,
}

/// `[session]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct SessionFileConfig {
    email: Option<String>,
    user_id: Option<String>,
}

/// `[view]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ViewFileConfig {
    default_sort: Option<String>,
}

/// `[avatar]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct AvatarFileConfig {
    base_url: Option<String>,
    size: Option<u32>,
    default_style: Option<String>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    // -- Session --
    /// Email of the signed-in user.
    pub email: String,
    /// Fixed user id. A fresh one is generated per run when unset.
    pub user_id: Option<UserId>,

    // -- View --
    /// Initial sort order.
    pub sort_by: SortOption,
    /// Initial filters (CLI only).
    pub filters: Filters,
    /// Name of the project to select on start (CLI only).
    pub project: Option<String>,

    // -- Avatar --
    pub avatar: AvatarConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            email: DEFAULT_EMAIL.to_string(),
            user_id: None,
            sort_by: SortOption::default(),
            filters: Filters::default(),
            project: None,
            avatar: AvatarConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an error.
    /// Otherwise the default path (`~/.config/taskflow/config.toml`) is tried
    /// and silently ignored if missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed,
    /// or holds a value that does not parse.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Self::resolve(cli, &file)
    }

    /// Resolve a `ClientConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default.
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let user_id = file
            .session
            .user_id
            .as_deref()
            .map(|raw| {
                raw.parse::<UserId>().map_err(|e| ConfigError::InvalidValue {
                    key: "session.user_id",
                    value: raw.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let file_sort = file
            .view
            .default_sort
            .as_deref()
            .map(|raw| {
                raw.parse::<SortOption>().map_err(|e| ConfigError::InvalidValue {
                    key: "view.default_sort",
                    value: raw.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        if let Some(size) = file.avatar.size.filter(|s| *s == 0) {
            return Err(ConfigError::InvalidValue {
                key: "avatar.size",
                value: size.to_string(),
                reason: "size must be positive".to_string(),
            });
        }

        Ok(Self {
            email: cli
                .email
                .clone()
                .or_else(|| file.session.email.clone())
                .unwrap_or(defaults.email),
            user_id,
            sort_by: cli.sort.or(file_sort).unwrap_or(defaults.sort_by),
            filters: Filters {
                status: cli.status.unwrap_or_default(),
                priority: cli.priority.unwrap_or_default(),
                search: cli.search.clone().unwrap_or_default(),
            },
            project: cli.project.clone(),
            avatar: AvatarConfig {
                base_url: file
                    .avatar
                    .base_url
                    .as_deref()
                    .map(|u| u.trim_end_matches('/').to_string())
                    .unwrap_or(defaults.avatar.base_url),
                size: file.avatar.size.unwrap_or(defaults.avatar.size),
                default_style: file
                    .avatar
                    .default_style
                    .clone()
                    .unwrap_or(defaults.avatar.default_style),
            },
        })
    }

    /// The identity to sign in with.
    #[must_use]
    pub fn current_user(&self) -> CurrentUser {
        CurrentUser::new(self.user_id.clone().unwrap_or_default(), self.email.clone())
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Task and project tracker")]
pub struct CliArgs {
    /// Path to config file (default: `~/.config/taskflow/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Email of the signed-in user.
    #[arg(long, env = "TASKFLOW_EMAIL")]
    pub email: Option<String>,

    /// Only show tasks of the project with this name.
    #[arg(long)]
    pub project: Option<String>,

    /// Status filter (`todos`, `na fila`, `em preparação`, ...).
    #[arg(long)]
    pub status: Option<StatusFilter>,

    /// Priority filter (`todas`, `urgente`, `alta`, `média`, `baixa`).
    #[arg(long)]
    pub priority: Option<PriorityFilter>,

    /// Case-insensitive text to look for in titles and descriptions.
    #[arg(long)]
    pub search: Option<String>,

    /// Sort order (`priority`, `dueDate`, `status`, `title`, `createdAt`).
    #[arg(long)]
    pub sort: Option<SortOption>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKFLOW_LOG")]
    pub log_level: String,

    /// Path to log file (default: stderr).
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("taskflow").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
