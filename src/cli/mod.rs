//! CLI module - Command-line interface for Poseidon
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Poseidon - trading back-office
/// Form-driven administration of bids, curve points, ratings, rules and trades
#[derive(Parser)]
#[command(name = "poseidon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (default)
    #[command(alias = "daemon")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Manage application users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Print the Argon2 digest of a password
    HashPassword {
        /// Plaintext password
        password: String,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a user
    Add {
        /// Login name
        username: String,
        /// Display name
        #[arg(long)]
        fullname: Option<String>,
        /// ADMIN or USER
        #[arg(long, default_value = "USER")]
        role: String,
        /// Password; a compliant one is generated when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// List users
    #[command(alias = "ls")]
    List,
}

pub use commands::*;
