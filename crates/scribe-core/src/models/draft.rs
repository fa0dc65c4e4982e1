//! Unsaved note input

use crate::error::{Error, Result};
use crate::models::note::{Note, DEFAULT_TITLE};

/// Shown when a draft has neither a title nor content.
pub const EMPTY_DRAFT_MESSAGE: &str = "Please enter a title or content";

/// Title/content being composed before a save.
///
/// Drafts live with the caller, never in the notes store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

impl NoteDraft {
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Seed a draft from a stored note for editing.
    #[must_use]
    pub fn from_note(note: &Note) -> Self {
        Self::new(note.title.clone(), note.content.clone())
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.content.trim().is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_blank() {
            return Err(Error::Validation(EMPTY_DRAFT_MESSAGE.to_string()));
        }
        Ok(())
    }

    /// Validate and return the `(title, content)` pair to save.
    ///
    /// A blank title becomes [`DEFAULT_TITLE`]; content is kept as typed.
    pub fn into_parts(self) -> Result<(String, String)> {
        self.validate()?;
        // Whitespace-only titles count as missing too.
        let title = if self.title.trim().is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            self.title
        };
        Ok((title, self.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_draft_is_rejected() {
        let error = NoteDraft::new("", "").validate().unwrap_err();
        assert_eq!(error, Error::Validation(EMPTY_DRAFT_MESSAGE.to_string()));
        assert!(NoteDraft::new("  ", "\n\t").into_parts().is_err());
    }

    #[test]
    fn missing_title_defaults_to_untitled() {
        let (title, content) = NoteDraft::new("", "just a body").into_parts().unwrap();
        assert_eq!(title, DEFAULT_TITLE);
        assert_eq!(content, "just a body");
    }

    #[test]
    fn whitespace_title_defaults_to_untitled() {
        let (title, content) = NoteDraft::new(" \t", "body").into_parts().unwrap();
        assert_eq!(title, DEFAULT_TITLE);
        assert_eq!(content, "body");
    }

    #[test]
    fn title_only_draft_keeps_empty_content() {
        let (title, content) = NoteDraft::new("Ideas", "").into_parts().unwrap();
        assert_eq!(title, "Ideas");
        assert!(content.is_empty());
    }
}
