//! Credential store boundary.
//!
//! Durable Tenant and Principal entities with uniqueness enforcement and no
//! business logic. Implementations live in `carehub-infra` (in-memory for
//! tests/dev, Postgres for production).

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use carehub_core::{Email, PrincipalId, TenantId};

use crate::activation::ActivationDigest;
use crate::{Principal, Tenant};

/// Globally unique attributes whose collision is reported as a conflict.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    LicenseNumber,
    PublicId,
}

impl UniqueField {
    pub fn as_str(self) -> &'static str {
        match self {
            UniqueField::Email => "email",
            UniqueField::LicenseNumber => "license_number",
            UniqueField::PublicId => "public_id",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{} already exists", .0.as_str())]
    Conflict(UniqueField),

    #[error("not found")]
    NotFound,

    /// Storage/transport failure. Logged, never shown to callers verbatim.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Tenant + principal persistence.
///
/// ## Atomicity requirements
///
/// - `create_tenant_with_admin` performs the uniqueness checks and both inserts
///   as one unit: either both rows exist afterwards or neither does, and two
///   concurrent registrations with the same email cannot both succeed.
/// - `activate_tenant` is a single conditional update keyed on the digest: it
///   returns the tenant only for the one caller that flipped it to `Active`.
///
/// ## Tenant isolation
///
/// Every method that touches principals on behalf of a tenant takes the
/// `TenantId` explicitly and must not return or mutate rows of another tenant.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn create_tenant_with_admin(&self, tenant: Tenant, admin: Principal) -> Result<(), StoreError>;

    /// Consume an activation digest. `Ok(None)` for unknown or already-used digests.
    async fn activate_tenant(&self, digest: &ActivationDigest) -> Result<Option<Tenant>, StoreError>;

    async fn get_tenant(&self, tenant_id: TenantId) -> Result<Option<Tenant>, StoreError>;

    async fn get_principal(&self, principal_id: PrincipalId) -> Result<Option<Principal>, StoreError>;

    async fn find_principal_by_email(&self, email: &Email) -> Result<Option<Principal>, StoreError>;

    /// Insert a staff principal into an existing tenant (email must be unused).
    async fn insert_principal(&self, principal: Principal) -> Result<(), StoreError>;

    async fn list_principals(&self, tenant_id: TenantId) -> Result<Vec<Principal>, StoreError>;

    /// Set the active flag of a principal of `tenant_id`. `Ok(None)` if no such
    /// principal exists in that tenant.
    async fn set_principal_active(
        &self,
        tenant_id: TenantId,
        principal_id: PrincipalId,
        active: bool,
    ) -> Result<Option<Principal>, StoreError>;
}

#[async_trait]
impl<S> CredentialStore for Arc<S>
where
    S: CredentialStore + ?Sized,
{
    async fn create_tenant_with_admin(&self, tenant: Tenant, admin: Principal) -> Result<(), StoreError> {
        (**self).create_tenant_with_admin(tenant, admin).await
    }

    async fn activate_tenant(&self, digest: &ActivationDigest) -> Result<Option<Tenant>, StoreError> {
        (**self).activate_tenant(digest).await
    }

    async fn get_tenant(&self, tenant_id: TenantId) -> Result<Option<Tenant>, StoreError> {
        (**self).get_tenant(tenant_id).await
    }

    async fn get_principal(&self, principal_id: PrincipalId) -> Result<Option<Principal>, StoreError> {
        (**self).get_principal(principal_id).await
    }

    async fn find_principal_by_email(&self, email: &Email) -> Result<Option<Principal>, StoreError> {
        (**self).find_principal_by_email(email).await
    }

    async fn insert_principal(&self, principal: Principal) -> Result<(), StoreError> {
        (**self).insert_principal(principal).await
    }

    async fn list_principals(&self, tenant_id: TenantId) -> Result<Vec<Principal>, StoreError> {
        (**self).list_principals(tenant_id).await
    }

    async fn set_principal_active(
        &self,
        tenant_id: TenantId,
        principal_id: PrincipalId,
        active: bool,
    ) -> Result<Option<Principal>, StoreError> {
        (**self).set_principal_active(tenant_id, principal_id, active).await
    }
}
