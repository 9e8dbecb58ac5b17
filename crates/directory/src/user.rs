//! User records, snapshots, and the directory trait.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use authgate_core::UserId;

use crate::password::{hash_password, verify_password};

/// What boundaries are allowed to echo back about a user.
///
/// Deliberately excludes the password hash and the permission set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

/// Registration input.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// Unknown email or wrong password. Deliberately one variant for both so
    /// callers cannot enumerate accounts.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration with an email that already has an account.
    #[error("email already registered")]
    EmailTaken,

    /// Registration input failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Lookup miss. Internal: the access boundary turns this into a deny
    /// decision, not a hard error.
    #[error("user not found")]
    UserNotFound,
}

/// The user directory the session and access layers consult.
pub trait UserDirectory: Send + Sync {
    fn find_by_id(&self, user_id: UserId) -> Option<UserSnapshot>;

    /// The user's effective granted-permission set (empty for unknown users).
    fn granted_permissions(&self, user_id: UserId) -> HashSet<String>;

    /// Verify email + password, returning the matched user.
    fn authenticate(&self, email: &str, password: &str) -> Result<UserSnapshot, DirectoryError>;

    fn register(&self, new_user: NewUser) -> Result<UserSnapshot, DirectoryError>;

    fn grant(&self, user_id: UserId, permission: &str) -> Result<(), DirectoryError>;
}

#[derive(Debug, Clone)]
struct UserRecord {
    snapshot: UserSnapshot,
    password_hash: String,
    permissions: HashSet<String>,
}

/// Password fed to `verify_password` on an unknown-email lookup so a miss
/// costs the same hashing work as a hit. Never matches: the record's stored
/// hash is what gets checked, and no record exists.
const DECOY_PASSWORD: &str = "decoy-never-matches";

/// In-memory directory.
///
/// Reference implementation for tests/dev; emails are matched
/// case-insensitively and stored lowercased.
#[derive(Debug)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, UserRecord>>,
    decoy_hash: String,
}

impl Default for InMemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            decoy_hash: hash_password(DECOY_PASSWORD).unwrap_or_default(),
        }
    }

    /// Drop the account entirely, as an admin-side deletion would.
    pub fn remove(&self, user_id: UserId) -> Result<(), DirectoryError> {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        users
            .remove(&user_id)
            .map(|_| ())
            .ok_or(DirectoryError::UserNotFound)
    }

    fn validate(new_user: &NewUser) -> Result<(), DirectoryError> {
        let email = new_user.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(DirectoryError::Validation("invalid email format".into()));
        }
        if new_user.display_name.trim().is_empty() {
            return Err(DirectoryError::Validation("display name cannot be empty".into()));
        }
        if new_user.password.len() < 8 {
            return Err(DirectoryError::Validation(
                "password must be at least 8 characters".into(),
            ));
        }
        Ok(())
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn find_by_id(&self, user_id: UserId) -> Option<UserSnapshot> {
        let users = self.users.read().unwrap_or_else(|e| e.into_inner());
        users.get(&user_id).map(|r| r.snapshot.clone())
    }

    fn granted_permissions(&self, user_id: UserId) -> HashSet<String> {
        let users = self.users.read().unwrap_or_else(|e| e.into_inner());
        users
            .get(&user_id)
            .map(|r| r.permissions.clone())
            .unwrap_or_default()
    }

    fn authenticate(&self, email: &str, password: &str) -> Result<UserSnapshot, DirectoryError> {
        let email = email.trim().to_lowercase();
        let users = self.users.read().unwrap_or_else(|e| e.into_inner());

        let Some(record) = users.values().find(|r| r.snapshot.email == email) else {
            // Burn the same hashing work on a miss as on a hit, so response
            // timing does not reveal whether the email exists.
            let _ = verify_password(&self.decoy_hash, password);
            return Err(DirectoryError::InvalidCredentials);
        };

        if !verify_password(&record.password_hash, password) {
            return Err(DirectoryError::InvalidCredentials);
        }
        Ok(record.snapshot.clone())
    }

    fn register(&self, new_user: NewUser) -> Result<UserSnapshot, DirectoryError> {
        Self::validate(&new_user)?;
        let email = new_user.email.trim().to_lowercase();

        let password_hash = hash_password(&new_user.password)
            .map_err(|e| DirectoryError::Validation(e.to_string()))?;

        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        if users.values().any(|r| r.snapshot.email == email) {
            return Err(DirectoryError::EmailTaken);
        }

        let snapshot = UserSnapshot {
            id: UserId::new(),
            email,
            display_name: new_user.display_name.trim().to_string(),
            created_at: Utc::now(),
        };
        users.insert(
            snapshot.id,
            UserRecord {
                snapshot: snapshot.clone(),
                password_hash,
                permissions: HashSet::new(),
            },
        );
        Ok(snapshot)
    }

    fn grant(&self, user_id: UserId, permission: &str) -> Result<(), DirectoryError> {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        let record = users.get_mut(&user_id).ok_or(DirectoryError::UserNotFound)?;
        record.permissions.insert(permission.to_string());
        Ok(())
    }
}
