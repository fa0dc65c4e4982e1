use scribe_core::backend::NotesBackend;
use scribe_core::{Note, NoteDraft, NotesStore};

use crate::error::CliError;

pub async fn run_add<B: NotesBackend>(
    store: &NotesStore<B>,
    title: Option<&str>,
    content: &str,
) -> Result<Note, CliError> {
    let (title, content) = NoteDraft::new(title.unwrap_or_default(), content).into_parts()?;
    let note = store.create(&title, &content).await?;

    tracing::info!("Created note {}", note.id);
    println!("{}", note.id);
    Ok(note)
}
