//! Data models for Scribe

mod draft;
mod note;

pub use draft::{NoteDraft, EMPTY_DRAFT_MESSAGE};
pub use note::{NewNote, Note, NoteId, NotePatch, DEFAULT_TITLE};
