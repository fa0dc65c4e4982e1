//! Note model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Title stored when a note is saved without one.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Backend-assigned note identifier.
///
/// Opaque to the client: it is only ever compared, displayed, and sent back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NoteId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            Err(Error::Validation("Note ID cannot be empty".to_string()))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A note row owned by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier, assigned at insertion
    pub id: NoteId,
    /// Owning user id
    pub user_id: String,
    pub title: String,
    /// Plain text body, may be empty
    pub content: String,
    /// Set by the backend at insertion
    pub created_at: DateTime<Utc>,
    /// Set at insertion, refreshed by the client on every update
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Title for display, falling back to [`DEFAULT_TITLE`].
    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            DEFAULT_TITLE
        } else {
            &self.title
        }
    }

    /// Apply a confirmed update to this note.
    pub fn apply_patch(&mut self, patch: &NotePatch) {
        self.title.clone_from(&patch.title);
        self.content.clone_from(&patch.content);
        self.updated_at = patch.updated_at;
    }
}

/// Insert payload; the backend assigns `id` and both timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub user_id: String,
}

/// Update payload for an existing note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotePatch {
    pub title: String,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

impl NotePatch {
    /// Build a patch stamped with the client's current time.
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            updated_at: Utc::now(),
        }
    }
}
