//! Avatar resolution: custom image, then gravatar, then initials.

use md5::{Digest, Md5};
use taskflow_proto::AppUser;

/// Name shown for a user with neither a name nor an email.
pub const FALLBACK_NAME: &str = "Usuário";

/// Number of colors initials avatars cycle through.
pub const INITIALS_COLORS: usize = 8;

/// Gravatar settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarConfig {
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Image size in pixels used by [`AvatarConfig::gravatar_url`].
    pub size: u32,
    /// Gravatar `d=` fallback style.
    pub default_style: String,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.gravatar.com/avatar".to_string(),
            size: 200,
            default_style: "identicon".to_string(),
        }
    }
}

impl AvatarConfig {
    /// Gravatar URL for `email` at the configured size and style.
    #[must_use]
    pub fn gravatar_url(&self, email: &str) -> Option<String> {
        gravatar_url(email, self.size, &self.default_style, &self.base_url)
    }
}

/// Rendered avatar sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AvatarSize {
    Xs,
    #[default]
    Sm,
    Md,
    Lg,
}

impl AvatarSize {
    /// Edge length in pixels.
    #[must_use]
    pub const fn pixels(self) -> u32 {
        match self {
            Self::Xs => 40,
            Self::Sm => 48,
            Self::Md => 64,
            Self::Lg => 80,
        }
    }
}

/// What to draw for a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Avatar {
    Image(String),
    Initials { text: String, color_index: usize },
}

/// Builds a gravatar URL for `email`.
///
/// The email is trimmed and lowercased, then MD5-hashed as gravatar expects.
/// Returns `None` for a blank email.
#[must_use]
pub fn gravatar_url(email: &str, size: u32, style: &str, base_url: &str) -> Option<String> {
    let normalized = email.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }
    let hash = format!("{:x}", Md5::digest(normalized.as_bytes()));
    Some(format!("{base_url}/{hash}?s={size}&d={style}"))
}

/// The name shown for `user`: profile name, else email local part.
#[must_use]
pub fn display_name(user: &AppUser) -> &str {
    user.name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .or_else(|| user.email_local_part())
        .unwrap_or(FALLBACK_NAME)
}

/// First letter of up to two words, uppercased.
#[must_use]
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

/// Stable color slot for `name`: sum of its UTF-16 code units modulo
/// [`INITIALS_COLORS`].
#[must_use]
pub fn initials_color(name: &str) -> usize {
    name.encode_utf16().map(usize::from).sum::<usize>() % INITIALS_COLORS
}

/// Picks the avatar for `user` at `size`.
#[must_use]
pub fn resolve_avatar(user: &AppUser, size: AvatarSize, config: &AvatarConfig) -> Avatar {
    if let Some(url) = user.avatar_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        return Avatar::Image(url.to_string());
    }
    if let Some(url) = gravatar_url(
        &user.email,
        size.pixels(),
        &config.default_style,
        &config.base_url,
    ) {
        return Avatar::Image(url);
    }
    let name = display_name(user);
    Avatar::Initials {
        text: initials(name),
        color_index: initials_color(name),
    }
}
