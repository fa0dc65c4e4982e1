use chrono::Local;
use scribe_core::backend::NotesBackend;
use scribe_core::NotesStore;

use crate::commands::common::{format_note_lines, load_notes, note_to_list_item, NoteListItem};
use crate::error::CliError;

pub const EMPTY_LIST_MESSAGE: &str = "No notes yet";

pub async fn run_list<B: NotesBackend>(store: &NotesStore<B>, as_json: bool) -> Result<(), CliError> {
    let notes = load_notes(store).await?;

    if as_json {
        let json_items = notes
            .iter()
            .map(note_to_list_item)
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if notes.is_empty() {
        println!("{EMPTY_LIST_MESSAGE}");
    } else {
        for line in format_note_lines(&notes, &Local::now()) {
            println!("{line}");
        }
    }

    Ok(())
}
