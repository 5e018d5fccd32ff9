//! User identity as seen by the task core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// A user known to the application, cached from the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppUser {
    pub id: UserId,
    pub email: String,
    /// Display name from the user's profile.
    pub name: Option<String>,
    /// Custom avatar image, takes precedence over the computed one.
    pub avatar_url: Option<String>,
}

impl AppUser {
    /// The local part of the email (before `@`), if any.
    #[must_use]
    pub fn email_local_part(&self) -> Option<&str> {
        self.email
            .split('@')
            .next()
            .filter(|local| !local.is_empty())
    }
}

/// A row of the `user_profiles` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
