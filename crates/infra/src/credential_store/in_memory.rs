use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use carehub_auth::{ActivationDigest, ActivationState, CredentialStore, Principal, StoreError, Tenant, UniqueField};
use carehub_core::{Email, PrincipalId, TenantId};

#[derive(Debug, Default)]
struct State {
    tenants: HashMap<TenantId, Tenant>,
    principals: HashMap<PrincipalId, Principal>,
}

impl State {
    fn principal_email_taken(&self, email: &Email) -> bool {
        self.principals.values().any(|p| &p.email == email)
    }

    fn tenant_conflict(&self, tenant: &Tenant) -> Option<UniqueField> {
        self.tenants.values().find_map(|t| {
            if t.email == tenant.email {
                Some(UniqueField::Email)
            } else if t.license_number == tenant.license_number {
                Some(UniqueField::LicenseNumber)
            } else if t.public_id == tenant.public_id {
                Some(UniqueField::PublicId)
            } else {
                None
            }
        })
    }
}

/// In-memory credential store.
///
/// Intended for tests/dev. A single lock guards tenants and principals so the
/// uniqueness checks and the inserts of a registration happen in one critical
/// section.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    state: RwLock<State>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create_tenant_with_admin(&self, tenant: Tenant, admin: Principal) -> Result<(), StoreError> {
        let mut state = self.write()?;

        if let Some(field) = state.tenant_conflict(&tenant) {
            return Err(StoreError::Conflict(field));
        }
        if state.principal_email_taken(&admin.email) {
            return Err(StoreError::Conflict(UniqueField::Email));
        }

        state.tenants.insert(tenant.id, tenant);
        state.principals.insert(admin.id, admin);
        Ok(())
    }

    async fn activate_tenant(&self, digest: &ActivationDigest) -> Result<Option<Tenant>, StoreError> {
        let mut state = self.write()?;
        let tenant = state.tenants.values_mut().find(|t| {
            t.state == ActivationState::Pending && t.activation_digest.as_ref() == Some(digest)
        });

        Ok(tenant.map(|t| {
            t.state = ActivationState::Active;
            t.activation_digest = None;
            t.clone()
        }))
    }

    async fn get_tenant(&self, tenant_id: TenantId) -> Result<Option<Tenant>, StoreError> {
        Ok(self.read()?.tenants.get(&tenant_id).cloned())
    }

    async fn get_principal(&self, principal_id: PrincipalId) -> Result<Option<Principal>, StoreError> {
        Ok(self.read()?.principals.get(&principal_id).cloned())
    }

    async fn find_principal_by_email(&self, email: &Email) -> Result<Option<Principal>, StoreError> {
        Ok(self
            .read()?
            .principals
            .values()
            .find(|p| &p.email == email)
            .cloned())
    }

    async fn insert_principal(&self, principal: Principal) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if !state.tenants.contains_key(&principal.tenant_id) {
            return Err(StoreError::NotFound);
        }
        if state.principal_email_taken(&principal.email) {
            return Err(StoreError::Conflict(UniqueField::Email));
        }
        state.principals.insert(principal.id, principal);
        Ok(())
    }

    async fn list_principals(&self, tenant_id: TenantId) -> Result<Vec<Principal>, StoreError> {
        let state = self.read()?;
        let mut principals: Vec<Principal> = state
            .principals
            .values()
            .filter(|p| p.tenant_id == tenant_id)
            .cloned()
            .collect();
        principals.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(principals)
    }

    async fn set_principal_active(
        &self,
        tenant_id: TenantId,
        principal_id: PrincipalId,
        active: bool,
    ) -> Result<Option<Principal>, StoreError> {
        let mut state = self.write()?;
        Ok(state
            .principals
            .get_mut(&principal_id)
            .filter(|p| p.tenant_id == tenant_id)
            .map(|p| {
                p.active = active;
                p.clone()
            }))
    }
}
