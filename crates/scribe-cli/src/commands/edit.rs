use scribe_core::backend::NotesBackend;
use scribe_core::{Note, NoteDraft, NotesStore};

use crate::commands::common::{load_notes, resolve_note};
use crate::error::CliError;

pub async fn run_edit<B: NotesBackend>(
    store: &NotesStore<B>,
    id: &str,
    title: Option<String>,
    content: Option<String>,
) -> Result<Note, CliError> {
    let notes = load_notes(store).await?;
    let note = resolve_note(&notes, id)?;

    let mut draft = NoteDraft::from_note(&note);
    if let Some(title) = title {
        draft.title = title;
    }
    if let Some(content) = content {
        draft.content = content;
    }

    if draft.title == note.title && draft.content == note.content {
        println!("{}", note.id);
        return Ok(note);
    }

    let (title, content) = draft.into_parts()?;
    store.update(&note.id, &title, &content).await?;

    let updated = store
        .get(&note.id)
        .ok_or_else(|| CliError::NoteNotFound(note.id.to_string()))?;
    println!("{}", updated.id);
    Ok(updated)
}
