//! CLI module for the model repository
//!
//! Operates on the `users` table through the cache-aside repository:
//! - `find`, `find-by`: reads (cache first for `find`)
//! - `insert`, `update`, `remove`: write-through mutations
//! - `init`: creates the table on PostgreSQL

pub mod user;

use clap::{Parser, Subcommand};

/// Cache-aside repository over relational storage
#[derive(Parser)]
#[command(name = "model-repository")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Find a user by identifier
    Find {
        /// User identifier
        id: String,
    },

    /// Find users whose attributes equal the given values
    FindBy(user::FindByArgs),

    /// Insert a new user
    Insert(user::InsertArgs),

    /// Change attributes of an existing user
    Update(user::UpdateArgs),

    /// Remove a user by identifier
    Remove {
        /// User identifier
        id: String,
    },

    /// Create the users table if it does not exist
    Init,
}
