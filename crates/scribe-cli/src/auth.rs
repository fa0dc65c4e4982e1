//! Keychain-backed session persistence for CLI profiles.

#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(not(test))]
use keyring::Entry;

use scribe_core::auth::{AuthError, AuthResult, AuthSession, SessionPersistence};
use scribe_core::backend::SupabaseBackend;
use scribe_core::config::BackendConfig;

#[cfg(not(test))]
const KEYRING_SERVICE_NAME: &str = "scribe-cli";

/// Supabase backend whose session lives in the OS keychain.
pub type CliBackend = SupabaseBackend<SessionStore>;

#[derive(Clone)]
pub struct SessionStore {
    username: String,
}

impl SessionStore {
    pub fn new(profile_name: &str) -> Self {
        Self {
            username: format!("supabase_session:{profile_name}"),
        }
    }

    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<String, String>> {
        static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(not(test))]
    fn entry(&self) -> AuthResult<Entry> {
        Entry::new(KEYRING_SERVICE_NAME, &self.username)
            .map_err(|error| AuthError::SecureStorage(error.to_string()))
    }
}

impl SessionPersistence for SessionStore {
    #[cfg(not(test))]
    fn load_session(&self) -> AuthResult<Option<AuthSession>> {
        match self.entry()?.get_password() {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(AuthError::SecureStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn load_session(&self) -> AuthResult<Option<AuthSession>> {
        let guard = Self::test_store()
            .lock()
            .map_err(|error| AuthError::SecureStorage(error.to_string()))?;
        if let Some(raw) = guard.get(&self.username) {
            Ok(Some(serde_json::from_str(raw)?))
        } else {
            Ok(None)
        }
    }

    #[cfg(not(test))]
    fn save_session(&self, session: &AuthSession) -> AuthResult<()> {
        let raw = serde_json::to_string(session)?;
        self.entry()?
            .set_password(&raw)
            .map_err(|error| AuthError::SecureStorage(error.to_string()))
    }

    #[cfg(test)]
    fn save_session(&self, session: &AuthSession) -> AuthResult<()> {
        let raw = serde_json::to_string(session)?;
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| AuthError::SecureStorage(error.to_string()))?;
        guard.insert(self.username.clone(), raw);
        Ok(())
    }

    #[cfg(not(test))]
    fn clear_session(&self) -> AuthResult<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(AuthError::SecureStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn clear_session(&self) -> AuthResult<()> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| AuthError::SecureStorage(error.to_string()))?;
        guard.remove(&self.username);
        Ok(())
    }
}

pub fn open_backend(profile_name: &str, config: &BackendConfig) -> scribe_core::Result<CliBackend> {
    SupabaseBackend::new(config, SessionStore::new(profile_name))
}

#[cfg(test)]
mod tests {
    use scribe_core::auth::AuthUser;

    use super::*;

    fn session(user_id: &str) -> AuthSession {
        AuthSession {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: 4_102_444_800,
            user: AuthUser {
                id: user_id.to_string(),
                email: Some(format!("{user_id}@example.com")),
            },
        }
    }

    #[test]
    fn session_store_is_scoped_per_profile() {
        let work = SessionStore::new("auth-test-work");
        let home = SessionStore::new("auth-test-home");

        work.save_session(&session("worker")).unwrap();

        assert_eq!(work.load_session().unwrap(), Some(session("worker")));
        assert_eq!(home.load_session().unwrap(), None);

        work.clear_session().unwrap();
        assert_eq!(work.load_session().unwrap(), None);
    }

    #[test]
    fn clearing_a_missing_session_is_ok() {
        assert!(SessionStore::new("auth-test-never-saved")
            .clear_session()
            .is_ok());
    }

    #[test]
    fn open_backend_reads_the_profile_session() {
        let config = BackendConfig::new("https://demo.supabase.co", "anon").unwrap();
        SessionStore::new("auth-test-backend")
            .save_session(&session("reader"))
            .unwrap();

        let backend = open_backend("auth-test-backend", &config).unwrap();
        let stored = backend.auth().stored_session().unwrap().unwrap();
        assert_eq!(stored.user.id, "reader");
    }
}
