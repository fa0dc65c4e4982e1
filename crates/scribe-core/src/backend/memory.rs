//! Process-local backend (primarily for tests).
//!
//! Mirrors the hosted backend's observable rules: rows are scoped to their
//! owner, writes outside the signed-in user's rows silently match nothing,
//! and inserts for another owner are rejected.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::auth::{validate_credentials, AuthUser, SessionEvent};
use crate::backend::{AccountBackend, NotesBackend};
use crate::models::{NewNote, Note, NoteId, NotePatch};
use crate::{Error, Result};

const SESSION_EVENT_CAPACITY: usize = 16;

/// Remote call kinds, for failure injection and call accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOp {
    CurrentUser,
    List,
    Insert,
    Update,
    Delete,
}

#[derive(Default)]
struct MemoryState {
    accounts: HashMap<String, (String, AuthUser)>,
    current: Option<AuthUser>,
    rows: Vec<Note>,
    failures: HashMap<BackendOp, String>,
    calls: Vec<BackendOp>,
}

pub struct InMemoryBackend {
    state: Mutex<MemoryState>,
    events: broadcast::Sender<SessionEvent>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);
        Self {
            state: Mutex::new(MemoryState::default()),
            events,
        }
    }

    /// Make the signed-in user `user_id` without going through an account.
    pub fn sign_in_as(&self, user_id: &str) -> AuthUser {
        let user = AuthUser {
            id: user_id.to_string(),
            email: None,
        };
        if let Ok(mut state) = self.state.lock() {
            state.current = Some(user.clone());
        }
        let _ = self.events.send(SessionEvent::SignedIn(user.clone()));
        user
    }

    /// Drop the current session and notify subscribers.
    pub fn sign_out_now(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.current = None;
        }
        let _ = self.events.send(SessionEvent::SignedOut);
    }

    /// Emit a token refresh notification without changing the session.
    pub fn refresh_token(&self) {
        let _ = self.events.send(SessionEvent::TokenRefreshed);
    }

    /// Insert a row directly, bypassing session checks.
    pub fn seed_note(
        &self,
        user_id: &str,
        title: &str,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> Note {
        let note = Note {
            id: NoteId::new(Uuid::now_v7().to_string()),
            user_id: user_id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            created_at,
            updated_at: created_at,
        };
        if let Ok(mut state) = self.state.lock() {
            state.rows.push(note.clone());
        }
        note
    }

    /// Fail the next call of kind `op` with a remote error.
    pub fn fail_next(&self, op: BackendOp, message: impl Into<String>) {
        if let Ok(mut state) = self.state.lock() {
            state.failures.insert(op, message.into());
        }
    }

    /// Remote calls made so far, in order.
    pub fn calls(&self) -> Vec<BackendOp> {
        self.state
            .lock()
            .map(|state| state.calls.clone())
            .unwrap_or_default()
    }

    /// Every stored row regardless of owner.
    pub fn rows(&self) -> Vec<Note> {
        self.state
            .lock()
            .map(|state| state.rows.clone())
            .unwrap_or_default()
    }

    fn begin(&self, op: BackendOp) -> Result<MutexGuard<'_, MemoryState>> {
        let mut state = self
            .state
            .lock()
            .map_err(|error| Error::Remote(error.to_string()))?;
        state.calls.push(op);
        if let Some(message) = state.failures.remove(&op) {
            return Err(Error::Remote(message));
        }
        Ok(state)
    }
}

impl MemoryState {
    fn current_owner(&self) -> Option<&str> {
        self.current.as_ref().map(|user| user.id.as_str())
    }
}

#[async_trait]
impl NotesBackend for InMemoryBackend {
    async fn current_user(&self) -> Result<Option<AuthUser>> {
        let state = self.begin(BackendOp::CurrentUser)?;
        Ok(state.current.clone())
    }

    async fn list_notes(&self, owner_id: &str) -> Result<Vec<Note>> {
        let state = self.begin(BackendOp::List)?;
        if state.current_owner() != Some(owner_id) {
            return Ok(Vec::new());
        }

        let mut notes = state
            .rows
            .iter()
            .filter(|note| note.user_id == owner_id)
            .cloned()
            .collect::<Vec<_>>();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notes)
    }

    async fn insert_note(&self, note: &NewNote) -> Result<Note> {
        let mut state = self.begin(BackendOp::Insert)?;
        if state.current_owner() != Some(note.user_id.as_str()) {
            return Err(Error::Remote(
                "new row violates row-level security policy for table \"notes\"".to_string(),
            ));
        }

        let now = Utc::now();
        let inserted = Note {
            id: NoteId::new(Uuid::now_v7().to_string()),
            user_id: note.user_id.clone(),
            title: note.title.clone(),
            content: note.content.clone(),
            created_at: now,
            updated_at: now,
        };
        state.rows.push(inserted.clone());
        Ok(inserted)
    }

    async fn update_note(&self, id: &NoteId, patch: &NotePatch) -> Result<()> {
        let mut state = self.begin(BackendOp::Update)?;
        let owner = state.current_owner().map(str::to_string);
        if let Some(row) = state
            .rows
            .iter_mut()
            .find(|row| &row.id == id && Some(row.user_id.as_str()) == owner.as_deref())
        {
            row.apply_patch(patch);
        }
        Ok(())
    }

    async fn delete_note(&self, id: &NoteId) -> Result<()> {
        let mut state = self.begin(BackendOp::Delete)?;
        let owner = state.current_owner().map(str::to_string);
        state
            .rows
            .retain(|row| !(&row.id == id && Some(row.user_id.as_str()) == owner.as_deref()));
        Ok(())
    }

    fn session_changes(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

#[async_trait]
impl AccountBackend for InMemoryBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        validate_credentials(email, password)?;
        let user = {
            let mut state = self
                .state
                .lock()
                .map_err(|error| Error::Remote(error.to_string()))?;
            let user = match state.accounts.get(email.trim()) {
                Some((stored, user)) if stored == password => user.clone(),
                _ => return Err(Error::Remote("Invalid login credentials (400)".to_string())),
            };
            state.current = Some(user.clone());
            user
        };
        let _ = self.events.send(SessionEvent::SignedIn(user.clone()));
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<AuthUser>> {
        validate_credentials(email, password)?;
        let email = email.trim().to_string();
        let user = {
            let mut state = self
                .state
                .lock()
                .map_err(|error| Error::Remote(error.to_string()))?;
            if state.accounts.contains_key(&email) {
                return Err(Error::Remote("User already registered (422)".to_string()));
            }
            let user = AuthUser {
                id: Uuid::now_v7().to_string(),
                email: Some(email.clone()),
            };
            state
                .accounts
                .insert(email, (password.to_string(), user.clone()));
            state.current = Some(user.clone());
            user
        };
        let _ = self.events.send(SessionEvent::SignedIn(user.clone()));
        Ok(Some(user))
    }

    async fn sign_out(&self) -> Result<()> {
        self.sign_out_now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[tokio::test]
    async fn list_is_owner_scoped_and_newest_first() {
        let backend = InMemoryBackend::new();
        let base = Utc::now();
        backend.seed_note("alice", "old", "", base - Duration::hours(2));
        backend.seed_note("alice", "new", "", base);
        backend.seed_note("bob", "other", "", base - Duration::hours(1));
        backend.sign_in_as("alice");

        let notes = backend.list_notes("alice").await.unwrap();
        let titles = notes.iter().map(|n| n.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, vec!["new", "old"]);
        assert!(backend.list_notes("bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_for_other_owner_is_rejected() {
        let backend = InMemoryBackend::new();
        backend.sign_in_as("alice");
        let error = backend
            .insert_note(&NewNote {
                title: "x".to_string(),
                content: String::new(),
                user_id: "bob".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Remote(_)));
        assert!(backend.rows().is_empty());
    }

    #[tokio::test]
    async fn writes_only_touch_own_rows() {
        let backend = InMemoryBackend::new();
        let bobs = backend.seed_note("bob", "mine", "", Utc::now());
        backend.sign_in_as("alice");

        backend
            .update_note(&bobs.id, &NotePatch::new("hijacked", ""))
            .await
            .unwrap();
        backend.delete_note(&bobs.id).await.unwrap();

        assert_eq!(backend.rows(), vec![bobs]);
    }

    #[tokio::test]
    async fn injected_failure_applies_once() {
        let backend = InMemoryBackend::new();
        backend.fail_next(BackendOp::CurrentUser, "network down");

        assert_eq!(
            backend.current_user().await.unwrap_err(),
            Error::Remote("network down".to_string())
        );
        assert!(backend.current_user().await.unwrap().is_none());
        assert_eq!(
            backend.calls(),
            vec![BackendOp::CurrentUser, BackendOp::CurrentUser]
        );
    }

    #[tokio::test]
    async fn sign_up_then_sign_in_round_trip() {
        let backend = InMemoryBackend::new();
        let mut events = backend.session_changes();

        let created = backend.sign_up("a@b.c", "pw").await.unwrap().unwrap();
        backend.sign_out().await.unwrap();
        let signed_in = backend.sign_in("a@b.c", "pw").await.unwrap();

        assert_eq!(created, signed_in);
        assert!(matches!(events.recv().await.unwrap(), SessionEvent::SignedIn(_)));
        assert_eq!(events.recv().await.unwrap(), SessionEvent::SignedOut);
        assert!(backend.sign_in("a@b.c", "wrong").await.is_err());
        assert!(matches!(
            backend.sign_in("", "pw").await,
            Err(Error::Validation(_))
        ));
    }
}
