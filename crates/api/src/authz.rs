//! API-side authorization guard.
//!
//! Enforces the RBAC table at the handler boundary, before any store access.

use axum::response::Response;

use carehub_auth::{authorize, Operation};

use crate::app::errors;
use crate::context::{PrincipalContext, TenantContext};

/// Check that the current request's principal may perform `operation`.
pub fn require(tenant: &TenantContext, principal: &PrincipalContext, operation: Operation) -> Result<(), Response> {
    authorize(&principal.authenticated(tenant), operation).map_err(|e| {
        tracing::info!(
            principal_id = %principal.principal_id(),
            operation = %operation,
            "authorization denied"
        );
        errors::authz_error_to_response(e)
    })
}
