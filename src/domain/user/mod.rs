//! User domain
//!
//! The user record persisted in the `users` table.

mod entity;

pub use entity::{User, USERS_TABLE};
