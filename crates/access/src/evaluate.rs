//! The decision algorithm.

use std::collections::HashSet;

use serde::Serialize;

use authgate_directory::UserSnapshot;

use crate::request::{AccessRequest, Logic, ResourceRef};

/// The outcome of one access check. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: String,
    #[serde(rename = "user", skip_serializing_if = "Option::is_none")]
    pub subject: Option<UserSnapshot>,
}

/// Evaluate `request` against the caller's granted permissions.
///
/// Requirement sets are built one per group plus, when non-empty, one for the
/// flat permission list (which therefore counts as one more independently
/// satisfiable set under OR). No requirement sets at all means allow: absence
/// of constraints is not a denial.
pub fn evaluate(granted: &HashSet<String>, request: &AccessRequest) -> AccessDecision {
    let mut requirement_sets: Vec<HashSet<&str>> = request
        .groups
        .iter()
        .map(|g| g.permissions.iter().map(String::as_str).collect())
        .collect();
    if !request.flat_permissions.is_empty() {
        requirement_sets.push(request.flat_permissions.iter().map(String::as_str).collect());
    }

    if requirement_sets.is_empty() {
        return AccessDecision {
            allowed: true,
            reason: with_resource("no permissions required".to_string(), &request.resource),
            subject: None,
        };
    }

    // A set is satisfied iff fully contained in the granted set; empty sets
    // are trivially satisfied.
    let satisfied: Vec<bool> = requirement_sets
        .iter()
        .map(|set| set.iter().all(|p| granted.contains(*p)))
        .collect();

    let allowed = match request.logic {
        Logic::And => satisfied.iter().all(|s| *s),
        Logic::Or => satisfied.iter().any(|s| *s),
    };

    let reason = if allowed {
        with_resource("access granted".to_string(), &request.resource)
    } else {
        let failing: Vec<String> = satisfied
            .iter()
            .enumerate()
            .filter(|(_, ok)| !**ok)
            .map(|(i, _)| {
                let mut missing: Vec<&str> = requirement_sets[i]
                    .iter()
                    .filter(|p| !granted.contains(**p))
                    .copied()
                    .collect();
                missing.sort_unstable();
                format!("set {} missing [{}]", i + 1, missing.join(", "))
            })
            .collect();
        with_resource(
            format!("access denied: {}", failing.join("; ")),
            &request.resource,
        )
    };

    AccessDecision {
        allowed,
        reason,
        subject: None,
    }
}

fn with_resource(reason: String, resource: &Option<ResourceRef>) -> String {
    match resource {
        Some(r) => {
            let kind = r.kind.as_deref().unwrap_or("unspecified");
            let id = r.id.as_deref().unwrap_or("unspecified");
            format!("{reason} (resource: {kind}/{id})")
        }
        None => reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::PermissionGroup;

    fn granted(perms: &[&str]) -> HashSet<String> {
        perms.iter().map(|p| p.to_string()).collect()
    }

    fn group(perms: &[&str]) -> PermissionGroup {
        PermissionGroup {
            permissions: perms.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn and_logic_requires_every_group() {
        let request = AccessRequest {
            groups: vec![group(&["a"]), group(&["b", "c"])],
            logic: Logic::And,
            ..Default::default()
        };

        let decision = evaluate(&granted(&["a", "b"]), &request);
        assert!(!decision.allowed);
        assert!(decision.reason.contains("missing [c]"));

        let decision = evaluate(&granted(&["a", "b", "c"]), &request);
        assert!(decision.allowed);
    }

    #[test]
    fn or_logic_needs_one_satisfied_group() {
        let request = AccessRequest {
            groups: vec![group(&["x"]), group(&["a"])],
            logic: Logic::Or,
            ..Default::default()
        };

        assert!(evaluate(&granted(&["a"]), &request).allowed);
        assert!(!evaluate(&granted(&["b"]), &request).allowed);
    }

    #[test]
    fn empty_request_allows_with_documented_reason() {
        let decision = evaluate(&HashSet::new(), &AccessRequest::default());
        assert!(decision.allowed);
        assert!(decision.reason.contains("no permissions required"));
    }

    #[test]
    fn empty_group_is_trivially_satisfied() {
        let request = AccessRequest {
            groups: vec![group(&[])],
            ..Default::default()
        };
        assert!(evaluate(&HashSet::new(), &request).allowed);
    }

    #[test]
    fn flat_permissions_form_one_additional_set() {
        // Under OR, the flat list is satisfiable independently of the groups.
        let request = AccessRequest {
            groups: vec![group(&["x"])],
            flat_permissions: vec!["a".to_string()],
            logic: Logic::Or,
            ..Default::default()
        };
        assert!(evaluate(&granted(&["a"]), &request).allowed);

        // Under AND it must hold alongside every group.
        let request = AccessRequest {
            logic: Logic::And,
            ..request
        };
        assert!(!evaluate(&granted(&["a"]), &request).allowed);
        assert!(evaluate(&granted(&["a", "x"]), &request).allowed);
    }

    #[test]
    fn duplicate_names_within_a_group_do_not_double_count() {
        let request = AccessRequest {
            groups: vec![group(&["a", "a"])],
            ..Default::default()
        };
        assert!(evaluate(&granted(&["a"]), &request).allowed);
    }

    #[test]
    fn resource_is_echoed_in_the_reason() {
        let request = AccessRequest {
            resource: Some(ResourceRef {
                id: Some("42".to_string()),
                kind: Some("order".to_string()),
            }),
            ..Default::default()
        };
        let decision = evaluate(&HashSet::new(), &request);
        assert!(decision.allowed);
        assert!(decision.reason.contains("order/42"));
    }

    #[test]
    fn missing_subject_is_omitted_from_the_wire_shape() {
        let decision = evaluate(&HashSet::new(), &AccessRequest::default());
        let value = serde_json::to_value(&decision).unwrap();
        assert!(value.get("user").is_none());
        assert_eq!(value["allowed"], true);
    }

    #[test]
    fn deny_reason_names_every_failing_set() {
        let request = AccessRequest {
            groups: vec![group(&["a"]), group(&["b"]), group(&["c"])],
            logic: Logic::And,
            ..Default::default()
        };
        let decision = evaluate(&granted(&["b"]), &request);
        assert!(!decision.allowed);
        assert!(decision.reason.contains("set 1"));
        assert!(decision.reason.contains("set 3"));
        assert!(!decision.reason.contains("set 2"));
    }
}
