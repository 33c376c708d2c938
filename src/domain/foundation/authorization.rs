//! Authorization support types.
//!
//! Ownership predicates in `domain::policy` are plain booleans. Handlers wrap
//! a decision in an `AuthorizationResult` so that denials are logged and
//! converted to `Forbidden` the same way everywhere, before any mutation.

use super::{Actor, DomainError, ErrorCode};

/// Result of an authorization check.
///
/// Contains both the decision and context for logging/auditing.
#[derive(Debug, Clone)]
pub struct AuthorizationResult {
    /// Whether access was granted.
    pub granted: bool,

    /// The resource type being accessed (e.g., "Session", "Availability").
    pub resource_type: &'static str,

    /// The ID of the resource being accessed.
    pub resource_id: String,

    /// The action that was requested (e.g., "cancel").
    pub action: &'static str,

    /// The user who requested access.
    pub user_id: String,

    /// Optional reason for denial (if denied).
    pub denial_reason: Option<String>,
}

impl AuthorizationResult {
    /// Builds a result from a predicate decision.
    pub fn decide(
        granted: bool,
        actor: &Actor,
        action: &'static str,
        resource_type: &'static str,
        resource_id: impl Into<String>,
    ) -> Self {
        let resource_id = resource_id.into();
        let denial_reason = if granted {
            None
        } else {
            Some(format!(
                "{} {} may not {} {} {}",
                actor.role, actor.user_id, action, resource_type, resource_id
            ))
        };
        Self {
            granted,
            resource_type,
            resource_id,
            action,
            user_id: actor.user_id.to_string(),
            denial_reason,
        }
    }

    /// Converts this result to a `Result<(), DomainError>`, logging denials.
    ///
    /// Returns `Ok(())` if granted, `Err(Forbidden)` if denied.
    pub fn into_result(self) -> Result<(), DomainError> {
        if self.granted {
            return Ok(());
        }

        tracing::warn!(
            user_id = %self.user_id,
            action = self.action,
            resource_type = self.resource_type,
            resource_id = %self.resource_id,
            "Authorization denied"
        );

        Err(DomainError::new(
            ErrorCode::Forbidden,
            self.denial_reason
                .unwrap_or_else(|| "Access denied".to_string()),
        )
        .with_detail("resource_type", self.resource_type)
        .with_detail("resource_id", self.resource_id)
        .with_detail("action", self.action)
        .with_detail("user_id", self.user_id))
    }

    /// Returns true if access was granted.
    pub fn is_granted(&self) -> bool {
        self.granted
    }
}

/// Resources that can appear in authorization decisions.
pub trait Authorizable {
    /// The type name for authorization logs (e.g., "Session").
    const RESOURCE_TYPE: &'static str;

    /// Returns a string representation of this resource's ID.
    fn resource_id(&self) -> String;
}

/// Gatekeeper used by handlers: decide, log, convert.
///
/// ```ignore
/// authorize(can_cancel_session(&session, &actor), &actor, "cancel", &session)?;
/// ```
pub fn authorize<T: Authorizable>(
    granted: bool,
    actor: &Actor,
    action: &'static str,
    resource: &T,
) -> Result<(), DomainError> {
    AuthorizationResult::decide(granted, actor, action, T::RESOURCE_TYPE, resource.resource_id())
        .into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Role, UserId};

    struct Desk {
        id: &'static str,
    }

    impl Authorizable for Desk {
        const RESOURCE_TYPE: &'static str = "Desk";

        fn resource_id(&self) -> String {
            self.id.to_string()
        }
    }

    fn actor() -> Actor {
        Actor::new(UserId::new("student-1").unwrap(), Role::Student)
    }

    #[test]
    fn granted_decision_has_no_reason() {
        let result = AuthorizationResult::decide(true, &actor(), "view", "Desk", "d-1");
        assert!(result.is_granted());
        assert!(result.denial_reason.is_none());
        assert!(result.into_result().is_ok());
    }

    #[test]
    fn denied_decision_becomes_forbidden_with_details() {
        let err = authorize(false, &actor(), "cancel", &Desk { id: "d-9" }).unwrap_err();

        assert_eq!(err.code, ErrorCode::Forbidden);
        assert_eq!(err.details.get("resource_type"), Some(&"Desk".to_string()));
        assert_eq!(err.details.get("resource_id"), Some(&"d-9".to_string()));
        assert_eq!(err.details.get("action"), Some(&"cancel".to_string()));
        assert!(err.message.contains("student student-1 may not cancel Desk d-9"));
    }
}
