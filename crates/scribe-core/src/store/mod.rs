//! Synced notes store.
//!
//! `NotesStore` owns the in-memory list of the signed-in user's notes and is
//! the only thing that mutates it. Each operation makes one backend call and
//! touches local state only after that call succeeds. Readers get snapshots
//! or a `watch` receiver that fires on every change.

mod state;

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::backend::NotesBackend;
use crate::models::{NewNote, Note, NoteId, NotePatch};
use crate::{Error, Result};

pub use state::{NotesState, StorePhase};

pub struct NotesStore<B: NotesBackend> {
    backend: Arc<B>,
    state: Arc<watch::Sender<NotesState>>,
}

impl<B: NotesBackend> Clone for NotesStore<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            state: Arc::clone(&self.state),
        }
    }
}

impl<B: NotesBackend> NotesStore<B> {
    pub fn new(backend: Arc<B>) -> Self {
        let (state, _) = watch::channel(NotesState::default());
        Self {
            backend,
            state: Arc::new(state),
        }
    }

    pub const fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Current state, cloned.
    pub fn snapshot(&self) -> NotesState {
        self.state.borrow().clone()
    }

    /// Receiver that is marked changed after every state mutation.
    pub fn subscribe(&self) -> watch::Receiver<NotesState> {
        self.state.subscribe()
    }

    pub fn notes(&self) -> Vec<Note> {
        self.state.borrow().notes.clone()
    }

    /// The live note with `id`, if held.
    pub fn get(&self, id: &NoteId) -> Option<Note> {
        self.state.borrow().get(id).cloned()
    }

    /// Reload every note owned by the current user.
    ///
    /// Never fails: a backend failure is recorded in `error` and the previous
    /// notes are kept. No signed-in user empties the store.
    pub async fn fetch_all(&self) {
        let op = InFlight::start(&self.state, true);

        match self.load_remote().await {
            Ok(notes) => {
                tracing::debug!("Loaded {} notes", notes.len());
                op.complete(true, |state| state.notes = notes);
            }
            Err(error) => {
                tracing::warn!("Failed to fetch notes: {}", error);
                let message = error.to_string();
                op.complete(false, |state| state.error = Some(message));
            }
        }
    }

    async fn load_remote(&self) -> Result<Vec<Note>> {
        let Some(user) = self.backend.current_user().await? else {
            return Ok(Vec::new());
        };
        self.backend.list_notes(&user.id).await
    }

    /// Insert a note for the current user and put it at the front.
    ///
    /// Callers validate input first (see `NoteDraft`).
    pub async fn create(&self, title: &str, content: &str) -> Result<Note> {
        let op = InFlight::start(&self.state, false);

        match self.insert_remote(title, content).await {
            Ok(note) => {
                let created = note.clone();
                op.complete(true, |state| state.prepend(note));
                Ok(created)
            }
            Err(error) => {
                op.complete(false, |_| {});
                Err(error)
            }
        }
    }

    async fn insert_remote(&self, title: &str, content: &str) -> Result<Note> {
        let user = self
            .backend
            .current_user()
            .await?
            .ok_or(Error::Unauthenticated)?;
        let new_note = NewNote {
            title: title.to_string(),
            content: content.to_string(),
            user_id: user.id,
        };
        self.backend.insert_note(&new_note).await
    }

    /// Replace the title and content of `id`, stamping `updated_at` now.
    ///
    /// The entry keeps its position; other entries are untouched.
    pub async fn update(&self, id: &NoteId, title: &str, content: &str) -> Result<()> {
        let op = InFlight::start(&self.state, false);
        let patch = NotePatch::new(title, content);

        match self.backend.update_note(id, &patch).await {
            Ok(()) => {
                op.complete(true, |state| state.apply_patch(id, &patch));
                Ok(())
            }
            Err(error) => {
                op.complete(false, |_| {});
                Err(error)
            }
        }
    }

    /// Delete `id` remotely, then drop it locally if held.
    pub async fn delete(&self, id: &NoteId) -> Result<()> {
        let op = InFlight::start(&self.state, false);

        match self.backend.delete_note(id).await {
            Ok(()) => {
                op.complete(true, |state| state.remove(id));
                Ok(())
            }
            Err(error) => {
                op.complete(false, |_| {});
                Err(error)
            }
        }
    }

    /// Load notes now and again on every session change.
    ///
    /// Must be called inside a Tokio runtime. The subscription lives as long
    /// as the returned guard.
    pub fn watch_session(&self) -> SessionWatch {
        let mut events = self.backend.session_changes();
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let store = self.clone();

        let task = tokio::spawn(async move {
            store.fetch_all().await;
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => break,
                    received = events.recv() => match received {
                        Ok(event) => {
                            tracing::debug!("Session changed ({:?}); refetching notes", event);
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!("Missed {} session events; refetching notes", skipped);
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
                store.fetch_all().await;
            }
        });

        SessionWatch {
            shutdown,
            task: Some(task),
        }
    }
}

/// Session-change subscription owned by a [`NotesStore`] user.
///
/// Dropping it unsubscribes. A fetch already in progress still runs to
/// completion; only the wait for the next event is interrupted.
#[derive(Debug)]
pub struct SessionWatch {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl SessionWatch {
    /// Unsubscribe and wait for any fetch already started to settle.
    pub async fn stop(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            if let Err(error) = task.await {
                tracing::warn!("Session listener ended abnormally: {}", error);
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for SessionWatch {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

/// Marks one operation in flight and always settles it, even when the
/// operation future is dropped before completion.
struct InFlight<'a> {
    state: &'a watch::Sender<NotesState>,
    clears_loading: bool,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn start(state: &'a watch::Sender<NotesState>, is_fetch: bool) -> Self {
        state.send_modify(|state| state.begin(is_fetch));
        Self {
            state,
            clears_loading: is_fetch,
            settled: false,
        }
    }

    fn complete(mut self, succeeded: bool, apply: impl FnOnce(&mut NotesState)) {
        let clears_loading = self.clears_loading;
        self.state.send_modify(|state| {
            apply(state);
            state.finish(succeeded, clears_loading);
        });
        self.settled = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let clears_loading = self.clears_loading;
            self.state
                .send_modify(|state| state.finish(false, clears_loading));
        }
    }
}
