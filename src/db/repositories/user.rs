use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::{Principal, Role};
use crate::entities::{prelude::*, users};

/// User data returned from repository (without sensitive password hash)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub fullname: String,
    pub role: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            fullname: model.fullname,
            role: model.role,
        }
    }
}

/// A new account. The password is already a digest.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub fullname: String,
    pub role: Role,
}

/// Replacement values for an existing account. `password_hash: None` keeps
/// the stored digest.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub username: String,
    pub fullname: String,
    pub role: Role,
    pub password_hash: Option<String>,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let users = Users::find()
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(users.into_iter().map(User::from).collect())
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(Users::find().count(&self.conn).await?)
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    /// Get the stored digest for a user (used by tests and password checks)
    pub async fn get_password_hash(&self, id: i32) -> Result<Option<String>> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(|u| u.password_hash))
    }

    /// Exact-match lookup returning everything the authentication provider needs.
    pub async fn find_principal(&self, username: &str) -> Result<Option<Principal>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        let Some(user) = user else {
            return Ok(None);
        };

        let role = user
            .role
            .parse::<Role>()
            .with_context(|| format!("User {} has an invalid role", user.id))?;

        Ok(Some(Principal {
            id: user.id,
            username: user.username,
            fullname: user.fullname,
            role,
            password_hash: user.password_hash,
        }))
    }

    /// Whether `username` is taken by a user other than `except_id`.
    pub async fn username_taken(&self, username: &str, except_id: Option<i32>) -> Result<bool> {
        let mut query = Users::find().filter(users::Column::Username.eq(username));
        if let Some(id) = except_id {
            query = query.filter(users::Column::Id.ne(id));
        }

        Ok(query.count(&self.conn).await? > 0)
    }

    pub async fn create(&self, user: NewUser) -> Result<User> {
        let active = users::ActiveModel {
            username: Set(user.username),
            password_hash: Set(user.password_hash),
            fullname: Set(user.fullname),
            role: Set(user.role.as_str().to_string()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        Ok(User::from(model))
    }

    /// Returns `None` when no user has this id.
    pub async fn update(&self, id: i32, changes: UserChanges) -> Result<Option<User>> {
        let Some(existing) = Users::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = existing.into();
        active.username = Set(changes.username);
        active.fullname = Set(changes.fullname);
        active.role = Set(changes.role.as_str().to_string());
        if let Some(hash) = changes.password_hash {
            active.password_hash = Set(hash);
        }

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update user")?;

        Ok(Some(User::from(model)))
    }

    /// Replaces the stored digest only; returns false when no user has this id.
    pub async fn set_password_hash(&self, id: i32, password_hash: String) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(
                users::Column::PasswordHash,
                sea_orm::sea_query::Expr::value(password_hash),
            )
            .filter(users::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to store password hash")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Users::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
