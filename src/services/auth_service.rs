//! Domain service for authentication.
//!
//! Resolves a username to a principal and checks a login attempt against
//! the stored digest without revealing which of the two was wrong.

use thiserror::Error;

use crate::domain::Principal;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No user has the requested username.
    #[error("Credentials not found")]
    CredentialsNotFound,

    /// Unknown username or wrong password. Callers must not tell them apart.
    #[error("Bad credentials")]
    BadCredentials,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Looks up exactly one user by exact username.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::CredentialsNotFound`] when no user matches.
    async fn load_principal(&self, username: &str) -> Result<Principal, AuthError>;

    /// Verifies a username/password pair and returns the principal.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::BadCredentials`] for an unknown username and for
    /// a wrong password alike, after the same amount of hashing work.
    async fn authenticate(&self, username: &str, password: &str) -> Result<Principal, AuthError>;
}
