//! Store state shape and its local reconciliation rules.

use crate::models::{Note, NoteId, NotePatch};

/// Lifecycle of the store as a whole.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StorePhase {
    /// Nothing has run yet
    #[default]
    Uninitialized,
    /// At least one operation is in flight
    Loading,
    /// The last operation to finish succeeded
    Ready,
    /// The last operation to finish failed
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotesState {
    /// Newest first at load time; created notes are prepended
    pub notes: Vec<Note>,
    /// True while a fetch is in flight, and before the first fetch
    pub loading: bool,
    /// Message from the last failed fetch
    pub error: Option<String>,
    pub phase: StorePhase,
    in_flight: usize,
}

impl Default for NotesState {
    fn default() -> Self {
        Self {
            notes: Vec::new(),
            loading: true,
            error: None,
            phase: StorePhase::Uninitialized,
            in_flight: 0,
        }
    }
}

impl NotesState {
    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub(super) fn begin(&mut self, is_fetch: bool) {
        self.in_flight += 1;
        self.phase = StorePhase::Loading;
        if is_fetch {
            self.loading = true;
            self.error = None;
        }
    }

    pub(super) fn finish(&mut self, succeeded: bool, clears_loading: bool) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if clears_loading {
            self.loading = false;
        }
        if self.in_flight == 0 {
            self.phase = if succeeded {
                StorePhase::Ready
            } else {
                StorePhase::Failed
            };
        }
    }

    /// Put `note` at the front, replacing any entry with the same id.
    pub(super) fn prepend(&mut self, note: Note) {
        self.remove(&note.id);
        self.notes.insert(0, note);
    }

    pub(super) fn apply_patch(&mut self, id: &NoteId, patch: &NotePatch) {
        if let Some(note) = self.notes.iter_mut().find(|note| &note.id == id) {
            note.apply_patch(patch);
        }
    }

    pub(super) fn remove(&mut self, id: &NoteId) {
        self.notes.retain(|note| &note.id != id);
    }
}
