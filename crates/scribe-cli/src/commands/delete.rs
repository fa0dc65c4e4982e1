use scribe_core::backend::NotesBackend;
use scribe_core::NotesStore;

use crate::commands::common::{load_notes, resolve_note};
use crate::error::CliError;

pub async fn run_delete<B: NotesBackend>(store: &NotesStore<B>, id: &str) -> Result<(), CliError> {
    let notes = load_notes(store).await?;
    let note = resolve_note(&notes, id)?;

    store.delete(&note.id).await?;
    println!("{}", note.id);
    Ok(())
}
