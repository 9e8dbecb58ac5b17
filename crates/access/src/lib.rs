//! `authgate-access` — the access-decision evaluator.
//!
//! Turns a caller's granted permissions and a structured access request
//! (permission groups combined with AND/OR, optional resource scope) into a
//! single allow/deny decision. Not a policy language: no negation, no nesting
//! beyond one level of groups under a single combinator.

pub mod checker;
pub mod evaluate;
pub mod request;

pub use checker::AccessChecker;
pub use evaluate::{AccessDecision, evaluate};
pub use request::{
    AccessRequest, InvalidRequest, Logic, PermissionGroup, RawAccessRequest, ResourceRef,
};
