//! `authgate-directory` — the user directory collaborator.
//!
//! Supplies user snapshots and each user's effective granted-permission set,
//! and owns credential verification (argon2 password hashes never leave this
//! crate). The session and access crates consume it through the
//! [`UserDirectory`] trait.

pub mod password;
pub mod user;

pub use user::{
    DirectoryError, InMemoryUserDirectory, NewUser, UserDirectory, UserSnapshot,
};
