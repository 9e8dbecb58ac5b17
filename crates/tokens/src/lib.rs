//! `authgate-tokens` — signed credential issue/verify (the credential codec).
//!
//! Stateless: every token is a pure function of its claims and the
//! process-wide signing secret. Nothing in this crate touches storage; the
//! session layer decides which refresh credential is currently live.

pub mod claims;
pub mod codec;
pub mod fingerprint;

pub use claims::{TokenClaims, TokenKind};
pub use codec::{SignedToken, TokenCodec, TokenError};
pub use fingerprint::fingerprint;
