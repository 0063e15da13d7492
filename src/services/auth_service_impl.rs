//! `SeaORM` implementation of the `AuthService` trait.

use crate::db::Store;
use crate::domain::Principal;
use crate::services::auth_service::{AuthError, AuthService};
use crate::services::password::PasswordHasher;
use async_trait::async_trait;

pub struct SeaOrmAuthService {
    store: Store,
    hasher: PasswordHasher,
    /// Digest verified when the username is unknown, so both failure paths
    /// cost one Argon2 verification.
    dummy_hash: String,
}

impl SeaOrmAuthService {
    pub fn new(store: Store, hasher: PasswordHasher) -> anyhow::Result<Self> {
        let dummy_hash = hasher.hash(&crate::domain::password::generate_password(16))?;

        Ok(Self {
            store,
            hasher,
            dummy_hash,
        })
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn load_principal(&self, username: &str) -> Result<Principal, AuthError> {
        self.store
            .user_repo()
            .find_principal(username)
            .await?
            .ok_or(AuthError::CredentialsNotFound)
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<Principal, AuthError> {
        let principal = match self.load_principal(username).await {
            Ok(principal) => Some(principal),
            Err(AuthError::CredentialsNotFound) => None,
            Err(e) => return Err(e),
        };

        let digest = principal
            .as_ref()
            .map_or_else(|| self.dummy_hash.clone(), |p| p.password_hash.clone());

        let is_valid = self
            .hasher
            .verify_async(password.to_string(), digest)
            .await;

        match principal {
            Some(principal) if is_valid => {
                self.upgrade_digest(&principal, password).await;
                Ok(principal)
            }
            _ => Err(AuthError::BadCredentials),
        }
    }
}

impl SeaOrmAuthService {
    /// Re-hashes a digest made under other Argon2 parameters so every stored
    /// digest verifies at the same cost as the dummy one. Failures leave the
    /// old digest in place.
    async fn upgrade_digest(&self, principal: &Principal, password: &str) {
        if !self.hasher.needs_rehash(&principal.password_hash) {
            return;
        }

        let stored = match self.hasher.hash_async(password.to_string()).await {
            Ok(digest) => {
                self.store
                    .user_repo()
                    .set_password_hash(principal.id, digest)
                    .await
            }
            Err(e) => Err(e),
        };

        match stored {
            Ok(_) => tracing::info!(user_id = principal.id, "Password digest upgraded"),
            Err(e) => tracing::warn!(user_id = principal.id, error = %e, "Password digest upgrade failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;
    use crate::db::NewUser;
    use crate::domain::Role;

    async fn service_with_user() -> SeaOrmAuthService {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .unwrap();
        let hasher = PasswordHasher::new(&SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        })
        .unwrap();

        store
            .user_repo()
            .create(NewUser {
                username: "alice".to_string(),
                password_hash: hasher.hash("Alicepass1!").unwrap(),
                fullname: "Alice".to_string(),
                role: Role::Admin,
            })
            .await
            .unwrap();

        SeaOrmAuthService::new(store, hasher).unwrap()
    }

    #[tokio::test]
    async fn test_load_principal() {
        let service = service_with_user().await;

        let principal = service.load_principal("alice").await.unwrap();
        assert_eq!(principal.role, Role::Admin);
        assert_eq!(principal.authority(), "ROLE_ADMIN");

        assert!(matches!(
            service.load_principal("Alice").await,
            Err(AuthError::CredentialsNotFound)
        ));
    }

    #[tokio::test]
    async fn test_login_upgrades_digest_from_old_params() {
        let service = service_with_user().await;
        let old = PasswordHasher::new(&SecurityConfig {
            argon2_memory_cost_kib: 2048,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        })
        .unwrap();
        let principal = service.load_principal("alice").await.unwrap();
        service
            .store
            .user_repo()
            .set_password_hash(principal.id, old.hash("Alicepass1!").unwrap())
            .await
            .unwrap();

        assert!(service.authenticate("alice", "Wrongpass1!").await.is_err());
        let digest = service.load_principal("alice").await.unwrap().password_hash;
        assert!(service.hasher.needs_rehash(&digest));

        service.authenticate("alice", "Alicepass1!").await.unwrap();
        let digest = service.load_principal("alice").await.unwrap().password_hash;
        assert!(!service.hasher.needs_rehash(&digest));
        assert!(service.hasher.verify("Alicepass1!", &digest));
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let service = service_with_user().await;
        let principal = service.authenticate("alice", "Alicepass1!").await.unwrap();
        assert_eq!(principal.username, "alice");
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_are_indistinguishable() {
        let service = service_with_user().await;

        let wrong_password = service
            .authenticate("alice", "Wrongpass1!")
            .await
            .unwrap_err();
        let unknown_user = service
            .authenticate("mallory", "Alicepass1!")
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AuthError::BadCredentials));
        assert!(matches!(unknown_user, AuthError::BadCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }
}
