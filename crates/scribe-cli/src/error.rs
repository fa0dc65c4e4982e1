use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] scribe_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Note ID cannot be empty")]
    EmptyNoteId,
    #[error("Note not found for id/prefix: {0}")]
    NoteNotFound(String),
    #[error("{0}")]
    AmbiguousNoteId(String),
    #[error("Failed to load notes: {0}")]
    Fetch(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "Backend is not configured. Run `scribe config init` or set SUPABASE_URL and SUPABASE_ANON_KEY."
    )]
    NotConfigured,
    #[error("Not signed in. Run `scribe auth login --email <email> --password <password>`.")]
    NotSignedIn,
}
