use carehub_auth::{AuthenticatedPrincipal, Role};
use carehub_core::{PrincipalId, TenantId};

/// Tenant context for a request.
///
/// Derived only from a verified session token; must be present for all
/// tenant-scoped routes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TenantContext {
    tenant_id: TenantId,
}

impl TenantContext {
    pub fn new(tenant_id: TenantId) -> Self {
        Self { tenant_id }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

/// Principal context for a request (authenticated identity + role).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal_id: PrincipalId,
    role: Role,
}

impl PrincipalContext {
    pub fn new(principal_id: PrincipalId, role: Role) -> Self {
        Self { principal_id, role }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Recombine with the tenant context into the verified principal.
    pub fn authenticated(&self, tenant: &TenantContext) -> AuthenticatedPrincipal {
        AuthenticatedPrincipal {
            principal_id: self.principal_id,
            tenant_id: tenant.tenant_id(),
            role: self.role,
        }
    }
}
