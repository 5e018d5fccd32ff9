//! Domain model and wire format for `TaskFlow`.

pub mod error;
pub mod filter;
pub mod history;
pub mod ids;
pub mod project;
pub mod row;
pub mod task;
pub mod user;

pub use error::{ParseError, ValidationError};
pub use filter::{Filters, PriorityFilter, SortOption, StatusFilter};
pub use history::{MAX_COMMENT_LENGTH, NewStatusHistoryEntry, StatusHistoryEntry};
pub use ids::{HistoryId, ProjectId, TaskId, UserId};
pub use project::{NewProject, Project, ProjectColor, ProjectPatch};
pub use task::{NewTask, Priority, Status, Task, TaskPatch};
pub use user::{AppUser, UserProfile};
