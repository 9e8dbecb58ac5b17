//! `authgate-core` — shared identity primitives.
//!
//! This crate contains only the strongly-typed identifiers the rest of the
//! workspace passes around. Nothing here performs IO or holds policy.

pub mod id;

pub use id::{IdParseError, SessionId, UserId};
