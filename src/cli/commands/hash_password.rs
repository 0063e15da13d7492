//! Hash password command handler

use crate::config::Config;
use crate::services::PasswordHasher;

pub fn cmd_hash_password(config: &Config, password: &str) -> anyhow::Result<()> {
    let hasher = PasswordHasher::new(&config.security)?;
    println!("{}", hasher.hash(password)?);
    Ok(())
}
