//! HTTP API: routing, guards, and request/response mapping.
//!
//! The transport layer composes the guards explicitly: the access guard runs
//! before every authenticated route, the refresh guard before the rotation
//! route. The core re-validates independently of either.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
