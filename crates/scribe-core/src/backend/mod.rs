//! Remote backend contract for notes and sessions.

mod memory;
mod supabase;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::auth::{AuthUser, SessionEvent};
use crate::models::{NewNote, Note, NoteId, NotePatch};
use crate::Result;

pub use memory::{BackendOp, InMemoryBackend};
pub use supabase::SupabaseBackend;

/// Row storage plus the session accessor the notes store depends on.
///
/// Every method is one remote round trip.
#[async_trait]
pub trait NotesBackend: Send + Sync + 'static {
    /// Currently signed-in user. No session is `Ok(None)`, never an error.
    async fn current_user(&self) -> Result<Option<AuthUser>>;

    /// All notes owned by `owner_id`, newest `created_at` first.
    async fn list_notes(&self, owner_id: &str) -> Result<Vec<Note>>;

    /// Insert a row and return it with its backend-assigned fields.
    async fn insert_note(&self, note: &NewNote) -> Result<Note>;

    async fn update_note(&self, id: &NoteId, patch: &NotePatch) -> Result<()>;

    async fn delete_note(&self, id: &NoteId) -> Result<()>;

    /// Sign-in, sign-out and token refresh notifications.
    fn session_changes(&self) -> broadcast::Receiver<SessionEvent>;
}

/// Account operations; not used by the notes store itself.
#[async_trait]
pub trait AccountBackend: Send + Sync + 'static {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser>;

    /// `Ok(None)` when the account must be confirmed before signing in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<AuthUser>>;

    async fn sign_out(&self) -> Result<()>;
}
