//! Account management: the only place plaintext passwords are turned into
//! digests before they reach the credential store.

use anyhow::Result;
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::db::{NewUser, Store, User, UserChanges};
use crate::domain::Role;
use crate::domain::password::generate_password;
use crate::services::password::PasswordHasher;

/// Validated account fields. `password` is plaintext and is dropped as soon
/// as it has been hashed; `None` on update keeps the stored digest.
#[derive(Clone)]
pub struct AccountInput {
    pub username: String,
    pub fullname: String,
    pub role: Role,
    pub password: Option<String>,
}

impl std::fmt::Debug for AccountInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountInput")
            .field("username", &self.username)
            .field("fullname", &self.fullname)
            .field("role", &self.role)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Clone)]
pub struct UserService {
    store: Store,
    hasher: PasswordHasher,
}

impl UserService {
    #[must_use]
    pub const fn new(store: Store, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        self.store.user_repo().list().await
    }

    pub async fn get(&self, id: i32) -> Result<Option<User>> {
        self.store.user_repo().get_by_id(id).await
    }

    pub async fn username_taken(&self, username: &str, except_id: Option<i32>) -> Result<bool> {
        self.store
            .user_repo()
            .username_taken(username, except_id)
            .await
    }

    pub async fn create(&self, input: AccountInput) -> Result<User> {
        let Some(password) = input.password else {
            anyhow::bail!("A password is required to create a user");
        };
        let password_hash = self.hasher.hash_async(password).await?;

        let user = self
            .store
            .user_repo()
            .create(NewUser {
                username: input.username,
                password_hash,
                fullname: input.fullname,
                role: input.role,
            })
            .await?;

        info!(user_id = user.id, username = %user.username, role = %user.role, "User created");
        Ok(user)
    }

    /// Returns `None` when the user no longer exists.
    pub async fn update(&self, id: i32, input: AccountInput) -> Result<Option<User>> {
        let password_hash = match input.password {
            Some(password) => Some(self.hasher.hash_async(password).await?),
            None => None,
        };
        let password_changed = password_hash.is_some();

        let user = self
            .store
            .user_repo()
            .update(
                id,
                UserChanges {
                    username: input.username,
                    fullname: input.fullname,
                    role: input.role,
                    password_hash,
                },
            )
            .await?;

        if let Some(user) = &user {
            info!(user_id = user.id, password_changed, "User updated");
        }
        Ok(user)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let deleted = self.store.user_repo().delete(id).await?;
        if deleted {
            info!(user_id = id, "User deleted");
        }
        Ok(deleted)
    }

    /// Creates the configured administrator when no user exists yet.
    /// Returns the generated password when one had to be made up; it is
    /// never written to the log.
    pub async fn ensure_initial_admin(&self, config: &SecurityConfig) -> Result<Option<String>> {
        if self.store.user_repo().count().await? > 0 {
            return Ok(None);
        }

        let (password, generated) = match &config.initial_admin_password {
            Some(password) => (password.clone(), false),
            None => (generate_password(16), true),
        };

        self.create(AccountInput {
            username: config.initial_admin_username.clone(),
            fullname: "Administrator".to_string(),
            role: Role::Admin,
            password: Some(password.clone()),
        })
        .await?;

        if generated {
            warn!(
                username = %config.initial_admin_username,
                "Created initial administrator with a generated password"
            );
            Ok(Some(password))
        } else {
            info!(username = %config.initial_admin_username, "Created initial administrator");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::password::check_password_policy;
    use std::sync::{Arc, Mutex};

    async fn service() -> (UserService, PasswordHasher, Store) {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .unwrap();
        let hasher = PasswordHasher::new(&SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        })
        .unwrap();
        (UserService::new(store.clone(), hasher.clone()), hasher, store)
    }

    fn account(password: Option<&str>) -> AccountInput {
        AccountInput {
            username: "newuser".to_string(),
            fullname: "New User".to_string(),
            role: Role::User,
            password: password.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_stores_digest_not_plaintext() {
        let (service, hasher, store) = service().await;
        let user = service.create(account(Some("Newpassword1*"))).await.unwrap();

        let digest = store
            .user_repo()
            .get_password_hash(user.id)
            .await
            .unwrap()
            .unwrap();
        assert_ne!(digest, "Newpassword1*");
        assert!(hasher.verify("Newpassword1*", &digest));
    }

    #[tokio::test]
    async fn test_create_requires_password() {
        let (service, _, _) = service().await;
        assert!(service.create(account(None)).await.is_err());
    }

    #[tokio::test]
    async fn test_update_rehashes_only_when_password_given() {
        let (service, hasher, store) = service().await;
        let user = service.create(account(Some("Newpassword1*"))).await.unwrap();

        service.update(user.id, account(None)).await.unwrap().unwrap();
        let digest = store.user_repo().get_password_hash(user.id).await.unwrap().unwrap();
        assert!(hasher.verify("Newpassword1*", &digest));

        service
            .update(user.id, account(Some("Updatedpassword*1")))
            .await
            .unwrap()
            .unwrap();
        let digest = store.user_repo().get_password_hash(user.id).await.unwrap().unwrap();
        assert!(hasher.verify("Updatedpassword*1", &digest));
        assert!(!hasher.verify("Newpassword1*", &digest));
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let (service, _, _) = service().await;
        assert!(service.update(42, account(None)).await.unwrap().is_none());
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_generated_admin_password_stays_out_of_logs() {
        let (service, _, _) = service().await;
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .json()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let password = service
            .ensure_initial_admin(&SecurityConfig::default())
            .await
            .unwrap()
            .expect("password generated");

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Created initial administrator"));
        assert!(!output.contains(&password));
    }

    #[tokio::test]
    async fn test_initial_admin_created_once() {
        let (service, _, _) = service().await;
        let config = SecurityConfig::default();

        let generated = service.ensure_initial_admin(&config).await.unwrap();
        let password = generated.expect("password generated");
        assert!(check_password_policy(&password).is_ok());

        assert!(service.ensure_initial_admin(&config).await.unwrap().is_none());
        assert_eq!(service.list().await.unwrap().len(), 1);
    }
}
