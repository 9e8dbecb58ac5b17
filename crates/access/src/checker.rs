//! Directory-backed access checking (what the boundary calls).

use std::sync::Arc;

use authgate_core::UserId;
use authgate_directory::UserDirectory;

use crate::evaluate::{AccessDecision, evaluate};
use crate::request::AccessRequest;

/// Loads the caller's permission set from the user directory and evaluates
/// the request against it.
pub struct AccessChecker {
    directory: Arc<dyn UserDirectory>,
}

impl AccessChecker {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Produce a decision for an already-authenticated caller.
    ///
    /// A directory miss is a deny decision, not an error: the caller was
    /// authenticated upstream, so an unknown id means the account vanished
    /// between authentication and this check.
    pub fn check(&self, user_id: UserId, request: &AccessRequest) -> AccessDecision {
        let Some(subject) = self.directory.find_by_id(user_id) else {
            tracing::debug!(user_id = %user_id, "access check for unknown user");
            return AccessDecision {
                allowed: false,
                reason: "user not found".to_string(),
                subject: None,
            };
        };

        let granted = self.directory.granted_permissions(user_id);
        let mut decision = evaluate(&granted, request);
        tracing::debug!(
            user_id = %user_id,
            allowed = decision.allowed,
            reason = %decision.reason,
            "access decision"
        );
        decision.subject = Some(subject);
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::PermissionGroup;
    use authgate_directory::{InMemoryUserDirectory, NewUser};

    fn directory_with_user(perms: &[&str]) -> (Arc<InMemoryUserDirectory>, UserId) {
        let dir = Arc::new(InMemoryUserDirectory::new());
        let snapshot = dir
            .register(NewUser {
                email: "alice@example.com".to_string(),
                password: "correct horse".to_string(),
                display_name: "Alice".to_string(),
            })
            .unwrap();
        for p in perms {
            dir.grant(snapshot.id, p).unwrap();
        }
        (dir, snapshot.id)
    }

    #[test]
    fn decision_carries_the_subject_snapshot() {
        let (dir, user_id) = directory_with_user(&["orders.read"]);
        let checker = AccessChecker::new(dir);

        let request = AccessRequest {
            groups: vec![PermissionGroup {
                permissions: vec!["orders.read".to_string()],
            }],
            ..Default::default()
        };

        let decision = checker.check(user_id, &request);
        assert!(decision.allowed);
        assert_eq!(decision.subject.unwrap().email, "alice@example.com");
    }

    #[test]
    fn unknown_user_is_a_deny_decision_not_an_error() {
        let (dir, _) = directory_with_user(&[]);
        let checker = AccessChecker::new(dir);

        let decision = checker.check(UserId::new(), &AccessRequest::default());
        assert!(!decision.allowed);
        assert_eq!(decision.reason, "user not found");
        assert!(decision.subject.is_none());
    }

    #[test]
    fn missing_permission_denies() {
        let (dir, user_id) = directory_with_user(&["orders.read"]);
        let checker = AccessChecker::new(dir);

        let request = AccessRequest {
            flat_permissions: vec!["orders.write".to_string()],
            ..Default::default()
        };
        let decision = checker.check(user_id, &request);
        assert!(!decision.allowed);
        assert!(decision.subject.is_some());
    }
}
