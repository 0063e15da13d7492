//! User management command handlers

use anyhow::{Context, bail};

use crate::config::Config;
use crate::db::Store;
use crate::domain::Role;
use crate::domain::password::{check_password_policy, generate_password};
use crate::services::{AccountInput, PasswordHasher, UserService};

async fn user_service(config: &Config) -> anyhow::Result<UserService> {
    let store = Store::new(&config.general.database_path).await?;
    let hasher = PasswordHasher::new(&config.security)?;
    Ok(UserService::new(store, hasher))
}

pub async fn cmd_user_add(
    config: &Config,
    username: &str,
    fullname: Option<&str>,
    role: &str,
    password: Option<&str>,
) -> anyhow::Result<()> {
    let role: Role = role.parse().context("Invalid role")?;
    let username = username.trim();
    if username.is_empty() {
        bail!("Username is mandatory");
    }

    let (password, generated) = match password {
        Some(password) => (password.to_string(), false),
        None => (generate_password(16), true),
    };
    if let Err(message) = check_password_policy(&password) {
        bail!("{message}");
    }

    let service = user_service(config).await?;
    if service.username_taken(username, None).await? {
        bail!("Username '{username}' already exists");
    }

    let user = service
        .create(AccountInput {
            username: username.to_string(),
            fullname: fullname.unwrap_or(username).to_string(),
            role,
            password: Some(password.clone()),
        })
        .await?;

    println!("✓ Created user {} (id {}, role {})", user.username, user.id, user.role);
    if generated {
        println!("  Generated password: {password}");
    }

    Ok(())
}

pub async fn cmd_user_list(config: &Config) -> anyhow::Result<()> {
    let users = user_service(config).await?.list().await?;

    if users.is_empty() {
        println!("No users.");
        return Ok(());
    }

    println!("Users ({} total)", users.len());
    println!("{:-<60}", "");
    for user in users {
        println!(
            "{:>4}  {:<20} {:<24} {}",
            user.id, user.username, user.fullname, user.role
        );
    }

    Ok(())
}
