//! Error types for scribe-core

use thiserror::Error;

use crate::auth::AuthError;

/// Result type alias using scribe-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in scribe-core operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A note operation ran without a signed-in user
    #[error("Not authenticated")]
    Unauthenticated,

    /// The backend call itself failed (network, validation, permission)
    #[error("{0}")]
    Remote(String),

    /// Caller-side precondition not met
    #[error("{0}")]
    Validation(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::Remote(format!("HTTP request failed: {error}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Remote(format!("Failed to parse JSON payload: {error}"))
    }
}

impl From<AuthError> for Error {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidConfiguration(message) => Self::Config(message.to_string()),
            AuthError::MissingCredentials => Self::Validation(error.to_string()),
            AuthError::Http(_) | AuthError::Json(_) | AuthError::Api(_) | AuthError::SecureStorage(_) => {
                Self::Remote(error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_map_onto_core_taxonomy() {
        assert!(matches!(
            Error::from(AuthError::MissingCredentials),
            Error::Validation(_)
        ));
        assert!(matches!(
            Error::from(AuthError::InvalidConfiguration("bad url")),
            Error::Config(_)
        ));
        assert_eq!(
            Error::from(AuthError::Api("Invalid login credentials (400)".to_string())),
            Error::Remote("Auth API error: Invalid login credentials (400)".to_string())
        );
    }
}
