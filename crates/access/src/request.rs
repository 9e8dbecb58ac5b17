//! Access request model: raw wire shape + pure validation into a typed form.
//!
//! The raw DTO keeps every field optional, mirroring how callers actually
//! send these requests. Validation is a single pure function
//! ([`AccessRequest::parse`]); nothing downstream does null checks.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// AND/OR combinator applied across requirement sets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Logic {
    #[default]
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

/// One group of permission names; satisfied iff fully contained in the
/// caller's granted set. Order irrelevant, duplicates tolerated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PermissionGroup {
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Advisory resource scope. Echoed in the decision reason; a resource-aware
/// caller supplies a resource-scoped granted set rather than this crate
/// branching on resource kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// The request as received on the wire; all fields optional, `logic` a free
/// string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAccessRequest {
    #[serde(default)]
    pub groups: Option<Vec<PermissionGroup>>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
    #[serde(default)]
    pub logic: Option<String>,
    #[serde(default)]
    pub resource: Option<ResourceRef>,
}

/// Malformed access request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidRequest {
    #[error("logic must be \"AND\" or \"OR\", got {0:?}")]
    UnknownLogic(String),
}

/// A validated access request. Defaults are fixed here: missing logic means
/// AND, missing groups/permissions mean empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessRequest {
    pub groups: Vec<PermissionGroup>,
    pub flat_permissions: Vec<String>,
    pub logic: Logic,
    pub resource: Option<ResourceRef>,
}

impl AccessRequest {
    /// Pure validation of the wire form.
    pub fn parse(raw: RawAccessRequest) -> Result<Self, InvalidRequest> {
        let logic = match raw.logic.as_deref() {
            None => Logic::default(),
            Some("AND") => Logic::And,
            Some("OR") => Logic::Or,
            Some(other) => return Err(InvalidRequest::UnknownLogic(other.to_string())),
        };

        Ok(Self {
            groups: raw.groups.unwrap_or_default(),
            flat_permissions: raw.permissions.unwrap_or_default(),
            logic,
            resource: raw.resource,
        })
    }
}
