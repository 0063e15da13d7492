use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, PasswordHasher, SeaOrmAuthService, UserService};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub hasher: PasswordHasher,

    pub auth_service: Arc<dyn AuthService>,

    pub user_service: UserService,
}

impl SharedState {
    /// Connects the database, applies migrations and makes sure an
    /// administrator exists before any request is served.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let hasher = PasswordHasher::new(&config.security)?;

        let user_service = UserService::new(store.clone(), hasher.clone());
        if let Some(password) = user_service.ensure_initial_admin(&config.security).await? {
            // Console only, so the plaintext never enters the log pipeline.
            eprintln!(
                "Initial administrator '{}' created with password: {password}",
                config.security.initial_admin_username
            );
        }

        let auth_service = Arc::new(SeaOrmAuthService::new(store.clone(), hasher.clone())?)
            as Arc<dyn AuthService>;

        Ok(Self {
            config: Arc::new(config),
            store,
            hasher,
            auth_service,
            user_service,
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}
