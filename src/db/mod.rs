use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::bid_list::{BidListInput, BidListRepository};
pub use repositories::curve_point::{CurvePointInput, CurvePointRepository};
pub use repositories::rating::{RatingInput, RatingRepository};
pub use repositories::rule_name::{RuleNameInput, RuleNameRepository};
pub use repositories::trade::{TradeInput, TradeRepository};
pub use repositories::user::{NewUser, User, UserChanges, UserRepository};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if db_url.starts_with("sqlite:") && !db_url.contains(":memory:") {
            let path_str = db_url
                .trim_start_matches("sqlite:")
                .trim_start_matches("//")
                .split('?')
                .next()
                .unwrap_or_default();
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn user_repo(&self) -> UserRepository {
        UserRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn bid_list_repo(&self) -> BidListRepository {
        BidListRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn curve_point_repo(&self) -> CurvePointRepository {
        CurvePointRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn rating_repo(&self) -> RatingRepository {
        RatingRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn rule_name_repo(&self) -> RuleNameRepository {
        RuleNameRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn trade_repo(&self) -> TradeRepository {
        TradeRepository::new(self.conn.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    async fn memory_store() -> Store {
        Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .expect("in-memory store")
    }

    fn curve_point(curve_id: i32, term: f64, value: f64) -> CurvePointInput {
        CurvePointInput {
            curve_id,
            as_of_date: None,
            term,
            value,
        }
    }

    #[tokio::test]
    async fn test_ping() {
        let store = memory_store().await;
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_curve_point_crud() {
        let store = memory_store().await;
        let repo = store.curve_point_repo();

        let created = repo.create(curve_point(3, 30.0, 300.0)).await.unwrap();
        assert_eq!(created.curve_id, 3);
        assert!(!created.creation_date.is_empty());
        assert_eq!(repo.count().await.unwrap(), 1);

        let updated = repo
            .update(created.id, curve_point(5, 50.0, 500.0))
            .await
            .unwrap()
            .expect("row exists");
        assert_eq!(updated.term, 50.0);
        assert_eq!(updated.creation_date, created.creation_date);

        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.get(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_rows() {
        let store = memory_store().await;
        let repo = store.curve_point_repo();

        assert!(repo.update(99, curve_point(1, 1.0, 1.0)).await.unwrap().is_none());
        assert!(!repo.delete(99).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rating_and_rule_name_create_from_blank_model() {
        let store = memory_store().await;

        let rating = store
            .rating_repo()
            .create(RatingInput {
                moodys_rating: "Aaa".to_string(),
                sand_p_rating: "AAA".to_string(),
                fitch_rating: "AAA".to_string(),
                order_number: 1,
            })
            .await
            .unwrap();
        assert_eq!(rating.order_number, 1);

        let rule = store
            .rule_name_repo()
            .create(RuleNameInput {
                name: "Rule".to_string(),
                description: "Description".to_string(),
                json: "{}".to_string(),
                template: "Template".to_string(),
                sql_str: "SELECT 1".to_string(),
                sql_part: "WHERE 1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(rule.name, "Rule");
        assert_eq!(store.rule_name_repo().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_bid_list_revision_date_set_on_update() {
        let store = memory_store().await;
        let repo = store.bid_list_repo();
        let input = BidListInput {
            account: "Account1".to_string(),
            bid_type: "Type1".to_string(),
            bid_quantity: 10.0,
            ask_quantity: None,
            bid: None,
            ask: None,
            benchmark: None,
            commentary: None,
            trader: None,
            book: None,
            side: None,
        };

        let created = repo.create(input.clone()).await.unwrap();
        assert!(created.revision_date.is_none());

        let updated = repo.update(created.id, input).await.unwrap().unwrap();
        assert!(updated.revision_date.is_some());
    }

    #[tokio::test]
    async fn test_user_update_keeps_hash_when_not_replaced() {
        let store = memory_store().await;
        let repo = store.user_repo();

        let user = repo
            .create(NewUser {
                username: "alice".to_string(),
                password_hash: "$argon2id$original".to_string(),
                fullname: "Alice".to_string(),
                role: Role::User,
            })
            .await
            .unwrap();
        assert_eq!(user.role, "USER");

        repo.update(
            user.id,
            UserChanges {
                username: "alice2".to_string(),
                fullname: "Alice Two".to_string(),
                role: Role::Admin,
                password_hash: None,
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(
            repo.get_password_hash(user.id).await.unwrap().as_deref(),
            Some("$argon2id$original")
        );

        let principal = repo.find_principal("alice2").await.unwrap().unwrap();
        assert_eq!(principal.role, Role::Admin);
        assert!(repo.find_principal("alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_username_taken() {
        let store = memory_store().await;
        let repo = store.user_repo();

        let user = repo
            .create(NewUser {
                username: "bob".to_string(),
                password_hash: "x".to_string(),
                fullname: "Bob".to_string(),
                role: Role::User,
            })
            .await
            .unwrap();

        assert!(repo.username_taken("bob", None).await.unwrap());
        assert!(!repo.username_taken("bob", Some(user.id)).await.unwrap());
        assert!(!repo.username_taken("carol", None).await.unwrap());
    }
}
