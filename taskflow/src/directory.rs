//! User directory resolution.
//!
//! The privileged directory call returns every user in one round trip but may
//! be refused. When it is, the users referenced by the loaded tasks are
//! looked up one profile at a time and anything unknown gets a placeholder.

use std::collections::HashSet;

use futures_util::future::join_all;
use taskflow_proto::{AppUser, Task, UserId, UserProfile};

use crate::gateway::Gateway;
use crate::session::CurrentUser;

/// Domain used for placeholder emails of users without a known address.
pub const PLACEHOLDER_EMAIL_DOMAIN: &str = "usuario.local";

/// Resolves the users relevant to `tasks`.
///
/// Tries [`Gateway::list_users`] first and falls back to
/// [`resolve_from_profiles`] when the directory call fails.
pub async fn resolve_users<G: Gateway>(
    gateway: &G,
    current_user: &CurrentUser,
    tasks: &[Task],
) -> Vec<AppUser> {
    match gateway.list_users().await {
        Ok(users) => users,
        Err(err) => {
            tracing::debug!(error = %err, "user directory unavailable, resolving from profiles");
            resolve_from_profiles(gateway, current_user, tasks).await
        }
    }
}

/// Builds the user list from individual profile lookups.
///
/// Collects the ids in `created_by` and `assigned_to` across `tasks`,
/// starting with `current_user`, and resolves each through
/// [`Gateway::get_profile`]. The current user comes first and the rest
/// follow in first-seen order. Users without a profile get a placeholder.
pub async fn resolve_from_profiles<G: Gateway>(
    gateway: &G,
    current_user: &CurrentUser,
    tasks: &[Task],
) -> Vec<AppUser> {
    let ids = referenced_users(current_user, tasks);
    let profiles = join_all(ids.iter().map(|id| gateway.get_profile(id))).await;

    ids.into_iter()
        .zip(profiles)
        .map(|(id, profile)| {
            let profile = profile.unwrap_or_else(|err| {
                tracing::debug!(user_id = %id, error = %err, "profile lookup failed");
                None
            });
            if id == current_user.id {
                session_user(current_user, profile)
            } else {
                profile_user(id, profile)
            }
        })
        .collect()
}

/// Distinct user ids: the current user, then task creators and assignees in
/// the order they appear.
fn referenced_users(current_user: &CurrentUser, tasks: &[Task]) -> Vec<UserId> {
    let mut seen = HashSet::new();
    let candidates = std::iter::once(&current_user.id).chain(
        tasks
            .iter()
            .flat_map(|t| std::iter::once(&t.created_by).chain(t.assigned_to.as_ref())),
    );
    candidates
        .filter(|id| seen.insert((*id).clone()))
        .cloned()
        .collect()
}

fn session_user(current_user: &CurrentUser, profile: Option<UserProfile>) -> AppUser {
    let mut user = AppUser {
        id: current_user.id.clone(),
        email: current_user.email.clone(),
        name: None,
        avatar_url: None,
    };
    let (name, avatar_url) = profile
        .map(|p| (p.display_name, p.avatar_url))
        .unwrap_or_default();
    user.name = name.or_else(|| user.email_local_part().map(str::to_string));
    user.avatar_url = avatar_url;
    user
}

fn profile_user(id: UserId, profile: Option<UserProfile>) -> AppUser {
    let short = id.short();
    let (name, avatar_url) = profile
        .map(|p| (p.display_name, p.avatar_url))
        .unwrap_or_default();
    AppUser {
        email: format!("{short}@{PLACEHOLDER_EMAIL_DOMAIN}"),
        name: Some(name.unwrap_or_else(|| format!("Usuário {short}"))),
        avatar_url,
        id,
    }
}
