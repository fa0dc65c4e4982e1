//! Supabase implementation: GoTrue for sessions, PostgREST for the `notes` table.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use tokio::sync::broadcast;

use crate::auth::{
    parse_api_error, AuthSession, AuthUser, SessionEvent, SessionPersistence, SignUpOutcome,
    SupabaseAuthClient,
};
use crate::backend::{AccountBackend, NotesBackend};
use crate::config::BackendConfig;
use crate::models::{NewNote, Note, NoteId, NotePatch};
use crate::{Error, Result};

const NOTES_TABLE: &str = "notes";

#[derive(Clone)]
pub struct SupabaseBackend<S: SessionPersistence> {
    auth: SupabaseAuthClient<S>,
    notes_url: String,
    anon_key: String,
    client: Client,
}

impl<S: SessionPersistence> SupabaseBackend<S> {
    pub fn new(config: &BackendConfig, store: S) -> Result<Self> {
        let client = Client::builder().build()?;
        let auth = SupabaseAuthClient::with_client(config, store, client.clone())?;

        Ok(Self {
            auth,
            notes_url: format!("{}/{NOTES_TABLE}", config.rest_url()),
            anon_key: config.supabase_anon_key.clone(),
            client,
        })
    }

    pub const fn auth(&self) -> &SupabaseAuthClient<S> {
        &self.auth
    }

    async fn active_session(&self) -> Result<AuthSession> {
        self.auth
            .restore_session()
            .await?
            .ok_or(Error::Unauthenticated)
    }

    fn authorized(&self, request: RequestBuilder, session: &AuthSession) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
    }

    async fn send(request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(Error::Remote(parse_api_error(status, &body)))
    }
}

/// PostgREST query for one owner's notes, newest first.
fn list_query(owner_id: &str) -> [(&'static str, String); 3] {
    [
        ("select", "*".to_string()),
        ("user_id", format!("eq.{owner_id}")),
        ("order", "created_at.desc".to_string()),
    ]
}

fn id_filter(id: &NoteId) -> [(&'static str, String); 1] {
    [("id", format!("eq.{id}"))]
}

#[async_trait]
impl<S: SessionPersistence> NotesBackend for SupabaseBackend<S> {
    async fn current_user(&self) -> Result<Option<AuthUser>> {
        Ok(self.auth.current_user().await?)
    }

    async fn list_notes(&self, owner_id: &str) -> Result<Vec<Note>> {
        let session = self.active_session().await?;
        let request = self.authorized(
            self.client
                .get(&self.notes_url)
                .query(&list_query(owner_id))
                .header("Accept", "application/json"),
            &session,
        );

        let notes = Self::send(request).await?.json::<Vec<Note>>().await?;
        tracing::debug!("Listed {} notes for {}", notes.len(), owner_id);
        Ok(notes)
    }

    async fn insert_note(&self, note: &NewNote) -> Result<Note> {
        let session = self.active_session().await?;
        let request = self.authorized(
            self.client
                .post(&self.notes_url)
                .header("Prefer", "return=representation")
                .json(&[note]),
            &session,
        );

        let mut inserted = Self::send(request).await?.json::<Vec<Note>>().await?;
        if inserted.is_empty() {
            return Err(Error::Remote(
                "Insert response did not include the created note".to_string(),
            ));
        }
        Ok(inserted.swap_remove(0))
    }

    async fn update_note(&self, id: &NoteId, patch: &NotePatch) -> Result<()> {
        let session = self.active_session().await?;
        let request = self.authorized(
            self.client
                .patch(&self.notes_url)
                .query(&id_filter(id))
                .json(patch),
            &session,
        );

        Self::send(request).await?;
        Ok(())
    }

    async fn delete_note(&self, id: &NoteId) -> Result<()> {
        let session = self.active_session().await?;
        let request = self.authorized(
            self.client.delete(&self.notes_url).query(&id_filter(id)),
            &session,
        );

        Self::send(request).await?;
        Ok(())
    }

    fn session_changes(&self) -> broadcast::Receiver<SessionEvent> {
        self.auth.subscribe()
    }
}

#[async_trait]
impl<S: SessionPersistence> AccountBackend for SupabaseBackend<S> {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        Ok(self.auth.sign_in(email, password).await?.user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<AuthUser>> {
        match self.auth.sign_up(email, password).await? {
            SignUpOutcome::SignedIn(session) => Ok(Some(session.user)),
            SignUpOutcome::ConfirmationRequired => Ok(None),
        }
    }

    async fn sign_out(&self) -> Result<()> {
        Ok(self.auth.sign_out().await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::auth::AuthResult;

    #[derive(Clone, Default)]
    struct NoSession {
        cleared: Arc<Mutex<bool>>,
    }

    impl SessionPersistence for NoSession {
        fn load_session(&self) -> AuthResult<Option<AuthSession>> {
            Ok(None)
        }

        fn save_session(&self, _session: &AuthSession) -> AuthResult<()> {
            Ok(())
        }

        fn clear_session(&self) -> AuthResult<()> {
            *self.cleared.lock().unwrap() = true;
            Ok(())
        }
    }

    fn backend() -> SupabaseBackend<NoSession> {
        let config = BackendConfig::new("https://demo.supabase.co/", "anon").unwrap();
        SupabaseBackend::new(&config, NoSession::default()).unwrap()
    }

    #[test]
    fn notes_url_targets_rest_table() {
        assert_eq!(
            backend().notes_url,
            "https://demo.supabase.co/rest/v1/notes"
        );
    }

    #[test]
    fn list_query_scopes_to_owner_newest_first() {
        let query = list_query("user-1");
        assert_eq!(query[0], ("select", "*".to_string()));
        assert_eq!(query[1], ("user_id", "eq.user-1".to_string()));
        assert_eq!(query[2], ("order", "created_at.desc".to_string()));
    }

    #[test]
    fn id_filter_matches_single_row() {
        let filter = id_filter(&NoteId::new("abc"));
        assert_eq!(filter[0], ("id", "eq.abc".to_string()));
    }

    #[test]
    fn insert_payload_is_single_row_array() {
        let note = NewNote {
            title: "T".to_string(),
            content: String::new(),
            user_id: "user-1".to_string(),
        };
        let payload = serde_json::to_value([&note]).unwrap();
        assert_eq!(payload[0]["user_id"], "user-1");
        assert_eq!(payload[0]["title"], "T");
        assert!(payload[0].get("id").is_none());
    }

    #[tokio::test]
    async fn no_session_means_no_user_and_unauthenticated_writes() {
        let backend = backend();
        assert!(backend.current_user().await.unwrap().is_none());

        let error = backend
            .delete_note(&NoteId::new("abc"))
            .await
            .unwrap_err();
        assert_eq!(error, Error::Unauthenticated);

        let error = backend.list_notes("user-1").await.unwrap_err();
        assert_eq!(error, Error::Unauthenticated);
    }
}
