use serde::Serialize;
use thiserror::Error;

use crate::{AuthenticatedPrincipal, Operation, Role};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthzError {
    /// The caller's role is not in the operation's allowed set.
    ///
    /// Only the operation is named; the caller's role is not echoed back.
    #[error("forbidden: not permitted to perform '{0}'")]
    Forbidden(Operation),
}

/// Authorize a verified principal for an operation.
///
/// - No IO
/// - No panics
/// - Must run after the session token was verified
pub fn authorize(principal: &AuthenticatedPrincipal, operation: Operation) -> Result<(), AuthzError> {
    if operation.allowed_roles().contains(&principal.role) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(operation))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// An operation together with the roles allowed to perform it.
#[derive(Debug, Clone, Serialize)]
pub struct OperationGrant {
    pub operation: Operation,
    pub allowed_roles: Vec<Role>,
}

/// The full RBAC table, for display/audit.
pub fn operation_table() -> Vec<OperationGrant> {
    Operation::ALL
        .into_iter()
        .map(|operation| OperationGrant {
            operation,
            allowed_roles: operation.allowed_roles().to_vec(),
        })
        .collect()
}

/// Why an authorization decision was made for the calling principal.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub operation: Operation,
    pub granted: bool,
    pub role: Role,
    pub allowed_roles: Vec<Role>,
}

/// Explain the decision [`authorize`] would make.
///
/// Only meant for the caller's own principal: it reports the caller's role,
/// which `AuthzError` deliberately leaves out.
pub fn explain_authorization(
    principal: &AuthenticatedPrincipal,
    operation: Operation,
) -> AuthorizationExplanation {
    AuthorizationExplanation {
        operation,
        granted: authorize(principal, operation).is_ok(),
        role: principal.role,
        allowed_roles: operation.allowed_roles().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carehub_core::{PrincipalId, TenantId};

    fn principal(role: Role) -> AuthenticatedPrincipal {
        AuthenticatedPrincipal {
            principal_id: PrincipalId::new(),
            tenant_id: TenantId::new(),
            role,
        }
    }

    #[test]
    fn every_role_operation_pair_follows_the_table() {
        for op in Operation::ALL {
            for role in Role::ALL {
                let allowed = op.allowed_roles().contains(&role);
                let result = authorize(&principal(role), op);
                if allowed {
                    assert!(result.is_ok(), "{role} should be allowed {op}");
                } else {
                    assert_eq!(result, Err(AuthzError::Forbidden(op)), "{role} should be denied {op}");
                }
            }
        }
    }

    #[test]
    fn forbidden_message_does_not_disclose_role() {
        let err = authorize(&principal(Role::Pharmacist), Operation::UsersManage).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("users.manage"));
        assert!(!msg.contains("PHARMACIST"));
    }

    #[test]
    fn explanation_agrees_with_authorize() {
        let nurse = principal(Role::Nurse);
        let e = explain_authorization(&nurse, Operation::PrescriptionsCreate);
        assert!(!e.granted);
        assert_eq!(e.role, Role::Nurse);
        assert_eq!(e.allowed_roles, vec![Role::Admin, Role::Doctor]);

        assert_eq!(operation_table().len(), Operation::ALL.len());
    }
}
