//! Authenticated session context.
//!
//! The state manager never looks the session up globally; it is handed a
//! [`SessionProvider`] at construction and asks it for the current user
//! before every operation.

use std::sync::Arc;

use parking_lot::RwLock;
use taskflow_proto::UserId;

/// Identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
}

impl CurrentUser {
    #[must_use]
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }
}

/// Source of the current session.
pub trait SessionProvider: Send + Sync {
    /// The signed-in user, or `None` when there is no session.
    fn current_user(&self) -> Option<CurrentUser>;
}

impl<T: SessionProvider + ?Sized> SessionProvider for Arc<T> {
    fn current_user(&self) -> Option<CurrentUser> {
        (**self).current_user()
    }
}

/// Mutable session holder.
#[derive(Debug, Default)]
pub struct SessionContext {
    user: RwLock<Option<CurrentUser>>,
}

impl SessionContext {
    /// A context with nobody signed in.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A context already signed in as `user`.
    #[must_use]
    pub fn signed_in(user: CurrentUser) -> Self {
        Self {
            user: RwLock::new(Some(user)),
        }
    }

    pub fn sign_in(&self, user: CurrentUser) {
        tracing::debug!(user_id = %user.id, "session started");
        *self.user.write() = Some(user);
    }

    pub fn sign_out(&self) {
        if let Some(user) = self.user.write().take() {
            tracing::debug!(user_id = %user.id, "session ended");
        }
    }
}

impl SessionProvider for SessionContext {
    fn current_user(&self) -> Option<CurrentUser> {
        self.user.read().clone()
    }
}
