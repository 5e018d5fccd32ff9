//! Project model and the fixed color palette.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ValidationError};
use crate::ids::ProjectId;

/// One of the eight palette colors a project can be tagged with.
///
/// Stored as the lowercase hex string in the `projects.color` column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProjectColor {
    /// `#3881ec`, the default.
    #[default]
    Azul,
    /// `#10b981`
    Verde,
    /// `#f59e0b`
    Laranja,
    /// `#ef4444`
    Vermelho,
    /// `#8b5cf6`
    Roxo,
    /// `#ec4899`
    Rosa,
    /// `#06b6d4`
    Ciano,
    /// `#84cc16`
    Lima,
}

impl ProjectColor {
    /// The palette in display order.
    pub const PALETTE: [Self; 8] = [
        Self::Azul,
        Self::Verde,
        Self::Laranja,
        Self::Vermelho,
        Self::Roxo,
        Self::Rosa,
        Self::Ciano,
        Self::Lima,
    ];

    /// Hex value with leading `#`.
    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Azul => "#3881ec",
            Self::Verde => "#10b981",
            Self::Laranja => "#f59e0b",
            Self::Vermelho => "#ef4444",
            Self::Roxo => "#8b5cf6",
            Self::Rosa => "#ec4899",
            Self::Ciano => "#06b6d4",
            Self::Lima => "#84cc16",
        }
    }

    /// Human-readable palette name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Azul => "Azul",
            Self::Verde => "Verde",
            Self::Laranja => "Laranja",
            Self::Vermelho => "Vermelho",
            Self::Roxo => "Roxo",
            Self::Rosa => "Rosa",
            Self::Ciano => "Ciano",
            Self::Lima => "Lima",
        }
    }
}

impl std::fmt::Display for ProjectColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.hex())
    }
}

impl FromStr for ProjectColor {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::PALETTE
            .into_iter()
            .find(|c| c.hex().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::Color(s.to_string()))
    }
}

impl TryFrom<String> for ProjectColor {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProjectColor> for String {
    fn from(color: ProjectColor) -> Self {
        color.hex().to_string()
    }
}

/// A named grouping that owns zero or more tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Server-assigned id.
    pub id: ProjectId,
    /// Non-empty name.
    pub name: String,
    /// Free text, may be empty.
    pub description: String,
    /// Palette color.
    pub color: ProjectColor,
    /// Server-assigned creation time.
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Merges the fields present in `patch` into this project.
    pub fn apply(&mut self, patch: &ProjectPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(description) = &patch.description {
            self.description.clone_from(description);
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
    }
}

/// Fields for creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    /// Name; must be non-empty after trimming.
    pub name: String,
    /// Description, may be empty.
    pub description: String,
    /// Palette color.
    pub color: ProjectColor,
}

impl NewProject {
    /// Creates a project payload.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, color: ProjectColor) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            color,
        }
    }

    /// Trims name and description and rejects an empty name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NameEmpty`] if the trimmed name is empty.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.name = self.name.trim().to_string();
        self.description = self.description.trim().to_string();
        if self.name.is_empty() {
            return Err(ValidationError::NameEmpty);
        }
        Ok(self)
    }
}

/// Partial update for a project. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectPatch {
    /// New name; must be non-empty after trimming.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New palette color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ProjectColor>,
}

impl ProjectPatch {
    /// Trims text fields and rejects an empty name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NameEmpty`] if a name is present and empty
    /// after trimming.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        if let Some(name) = self.name.as_mut() {
            *name = name.trim().to_string();
            if name.is_empty() {
                return Err(ValidationError::NameEmpty);
            }
        }
        if let Some(description) = self.description.as_mut() {
            *description = description.trim().to_string();
        }
        Ok(self)
    }
}
