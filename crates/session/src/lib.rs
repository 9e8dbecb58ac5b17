//! `authgate-session` — session lifecycle: login, rotation, logout.
//!
//! The store enforces the core invariant: at most one refresh credential is
//! valid for a session at any instant. Rotation replaces that credential
//! atomically, which is the entire revocation mechanism — no revocation list.

pub mod manager;
pub mod store;

pub use manager::{CredentialPair, SessionError, SessionManager};
pub use store::{InMemorySessionStore, Session, SessionStore, SessionStoreError};
