use chrono::Local;
use scribe_core::backend::NotesBackend;
use scribe_core::{NotesState, NotesStore};

use crate::commands::common::{format_note_lines, require_user};
use crate::commands::list::EMPTY_LIST_MESSAGE;
use crate::error::CliError;

/// Redraw the list on every store change until Ctrl-C.
pub async fn run_watch<B: NotesBackend>(store: &NotesStore<B>) -> Result<(), CliError> {
    require_user(store).await?;

    let mut receiver = store.subscribe();
    let session = store.watch_session();

    loop {
        tokio::select! {
            changed = receiver.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = receiver.borrow_and_update().clone();
                for line in render_state(&state) {
                    println!("{line}");
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    session.stop().await;
    Ok(())
}

pub fn render_state(state: &NotesState) -> Vec<String> {
    let mut lines = vec![String::new()];
    if let Some(error) = &state.error {
        lines.push(format!("Error: {error}"));
    }

    if state.loading && state.notes.is_empty() {
        lines.push("Loading...".to_string());
    } else if state.notes.is_empty() {
        lines.push(EMPTY_LIST_MESSAGE.to_string());
    } else {
        lines.extend(format_note_lines(&state.notes, &Local::now()));
    }
    lines
}
