//! Authentication service: registration, activation, login, session verification
//! and staff management, on top of a [`CredentialStore`].
//!
//! Role checks are *not* done here; callers gate operations with
//! [`crate::authorize`] before invoking the staff-management methods.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::instrument;

use carehub_core::{Email, LicenseNumber, PrincipalId, TenantId, TenantPublicId};

use crate::activation::{ActivationSecret, ActivationState};
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::notifier::{ActivationNotice, ActivationNotifier};
use crate::password::{dummy_verify, hash_password, verify_password};
use crate::store::CredentialStore;
use crate::token::TokenIssuer;
use crate::{AuthenticatedPrincipal, Principal, PrincipalSummary, Role, Tenant};

/// Hospital self-registration request.
#[derive(Debug, Clone)]
pub struct RegisterTenant {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub license_number: String,
    pub password: String,
}

/// Returned to the registrant only; the raw token is never stored.
#[derive(Debug, Clone)]
pub struct ActivationReference {
    pub tenant_id: TenantId,
    pub public_id: TenantPublicId,
    pub token: ActivationSecret,
    pub link: String,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub principal_id: PrincipalId,
    pub name: String,
    pub role: Role,
    pub hospital_name: String,
    pub hospital_public_id: TenantPublicId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Staff account created by a tenant admin.
#[derive(Debug, Clone)]
pub struct NewStaff {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub department: Option<String>,
    pub specialization: Option<String>,
}

/// Turns a bearer token into a store-confirmed principal.
///
/// Object-safe so the HTTP layer can hold `Arc<dyn SessionVerifier>`.
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AuthenticatedPrincipal, AuthError>;
}

pub struct AuthService<S> {
    store: S,
    issuer: TokenIssuer,
    notifier: Arc<dyn ActivationNotifier>,
    config: AuthConfig,
}

impl<S> core::fmt::Debug for AuthService<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthService")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl<S> AuthService<S>
where
    S: CredentialStore,
{
    pub fn new(store: S, issuer: TokenIssuer, notifier: Arc<dyn ActivationNotifier>, config: AuthConfig) -> Self {
        Self {
            store,
            issuer,
            notifier,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Create a Pending tenant and its initial ADMIN in one atomic store call.
    #[instrument(skip_all)]
    pub async fn register(&self, input: RegisterTenant) -> Result<ActivationReference, AuthError> {
        let name = required(&input.name, "name")?;
        let email = Email::parse(&input.email)?;
        let license_number = LicenseNumber::parse(&input.license_number)?;
        self.check_password(&input.password)?;

        let password_hash = self.hash(input.password).await?;
        let secret = ActivationSecret::generate();
        let now = Utc::now();

        let tenant = Tenant {
            id: TenantId::new(),
            public_id: TenantPublicId::new(),
            name: name.clone(),
            email: email.clone(),
            license_number,
            phone: optional(input.phone),
            address: optional(input.address),
            state: ActivationState::Pending,
            activation_digest: Some(secret.digest()),
            created_at: now,
        };
        let admin = Principal {
            id: PrincipalId::new(),
            tenant_id: tenant.id,
            email: email.clone(),
            first_name: name.clone(),
            last_name: "Admin".to_string(),
            password_hash,
            role: Role::Admin,
            active: true,
            department: None,
            specialization: None,
            created_at: now,
        };

        let (tenant_id, public_id) = (tenant.id, tenant.public_id);
        self.store.create_tenant_with_admin(tenant, admin).await?;
        tracing::info!(tenant_id = %tenant_id, public_id = %public_id, "tenant registered");

        let link = self.config.activation_link(secret.expose());
        let notifier = Arc::clone(&self.notifier);
        let notice = ActivationNotice {
            hospital_name: name,
            email,
            activation_link: link.clone(),
        };
        tokio::spawn(async move { notifier.notify(notice).await });

        Ok(ActivationReference {
            tenant_id,
            public_id,
            token: secret,
            link,
        })
    }

    /// Redeem an activation token. Unknown and replayed tokens fail the same way.
    #[instrument(skip_all)]
    pub async fn activate(&self, token: &str) -> Result<Tenant, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::InvalidActivationToken);
        }
        let digest = ActivationSecret::from_raw(token.trim()).digest();
        match self.store.activate_tenant(&digest).await? {
            Some(tenant) => {
                tracing::info!(tenant_id = %tenant.id, "tenant activated");
                Ok(tenant)
            }
            None => Err(AuthError::InvalidActivationToken),
        }
    }

    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let found = match Email::parse(email) {
            Ok(email) => self.store.find_principal_by_email(&email).await?,
            Err(_) => None,
        };

        let Some(principal) = found else {
            let password = password.to_string();
            let _ = tokio::task::spawn_blocking(move || dummy_verify(&password)).await;
            return Err(AuthError::InvalidCredentials);
        };

        let matches = self.verify_hash(password.to_string(), principal.password_hash.clone()).await?;
        if !matches || !principal.active {
            tracing::info!(principal_id = %principal.id, "login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let tenant = self
            .store
            .get_tenant(principal.tenant_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        if !tenant.is_active() {
            return Err(AuthError::TenantNotActive);
        }

        let issued = self.issuer.issue(principal.id, tenant.id, principal.role, Utc::now())?;
        tracing::info!(principal_id = %principal.id, tenant_id = %tenant.id, "login succeeded");

        Ok(LoginOutcome {
            principal_id: principal.id,
            name: principal.display_name(),
            role: principal.role,
            hospital_name: tenant.name,
            hospital_public_id: tenant.public_id,
            token: issued.token,
            expires_at: issued.expires_at,
        })
    }

    /// Signature + expiry, then re-read principal and tenant from the store.
    pub async fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<AuthenticatedPrincipal, AuthError> {
        let claims = self.issuer.decode(token, now)?;

        let principal = self
            .store
            .get_principal(claims.sub)
            .await?
            .ok_or(AuthError::PrincipalUnavailable)?;
        if !principal.active || principal.tenant_id != claims.tenant_id || principal.role != claims.role {
            return Err(AuthError::PrincipalUnavailable);
        }

        let tenant_active = self
            .store
            .get_tenant(principal.tenant_id)
            .await?
            .is_some_and(|t| t.is_active());
        if !tenant_active {
            return Err(AuthError::PrincipalUnavailable);
        }

        Ok(AuthenticatedPrincipal {
            principal_id: principal.id,
            tenant_id: principal.tenant_id,
            role: principal.role,
        })
    }

    pub async fn current_principal(&self, actor: &AuthenticatedPrincipal) -> Result<Principal, AuthError> {
        self.store
            .get_principal(actor.principal_id)
            .await?
            .filter(|p| p.tenant_id == actor.tenant_id)
            .ok_or(AuthError::PrincipalUnavailable)
    }

    pub async fn current_tenant(&self, actor: &AuthenticatedPrincipal) -> Result<Tenant, AuthError> {
        self.store
            .get_tenant(actor.tenant_id)
            .await?
            .ok_or(AuthError::PrincipalUnavailable)
    }

    #[instrument(skip(self, input), fields(tenant_id = %tenant_id))]
    pub async fn create_staff(&self, tenant_id: TenantId, input: NewStaff) -> Result<PrincipalSummary, AuthError> {
        let email = Email::parse(&input.email)?;
        let first_name = required(&input.first_name, "first_name")?;
        let last_name = required(&input.last_name, "last_name")?;
        self.check_password(&input.password)?;

        let principal = Principal {
            id: PrincipalId::new(),
            tenant_id,
            email,
            first_name,
            last_name,
            password_hash: self.hash(input.password).await?,
            role: input.role,
            active: true,
            department: optional(input.department),
            specialization: optional(input.specialization),
            created_at: Utc::now(),
        };
        let summary = principal.summary();
        self.store.insert_principal(principal).await?;
        tracing::info!(principal_id = %summary.id, role = %summary.role, "staff created");
        Ok(summary)
    }

    pub async fn list_staff(&self, tenant_id: TenantId) -> Result<Vec<PrincipalSummary>, AuthError> {
        let principals = self.store.list_principals(tenant_id).await?;
        Ok(principals.iter().map(Principal::summary).collect())
    }

    /// Deactivate a principal of the actor's tenant. Outstanding tokens stop verifying.
    #[instrument(skip(self, actor), fields(tenant_id = %actor.tenant_id))]
    pub async fn deactivate_staff(
        &self,
        actor: &AuthenticatedPrincipal,
        target: PrincipalId,
    ) -> Result<PrincipalSummary, AuthError> {
        if actor.principal_id == target {
            return Err(AuthError::validation("cannot deactivate your own account"));
        }
        let principal = self
            .store
            .set_principal_active(actor.tenant_id, target, false)
            .await?
            .ok_or(AuthError::NotFound)?;
        tracing::info!(principal_id = %principal.id, "staff deactivated");
        Ok(principal.summary())
    }

    fn check_password(&self, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < self.config.min_password_length {
            return Err(AuthError::validation(format!(
                "password must be at least {} characters",
                self.config.min_password_length
            )));
        }
        Ok(())
    }

    async fn hash(&self, password: String) -> Result<String, AuthError> {
        let pepper = self.config.password_pepper.clone();
        tokio::task::spawn_blocking(move || hash_password(&password, pepper.as_deref()))
            .await
            .map_err(|e| AuthError::Crypto(format!("hashing task: {e}")))?
    }

    async fn verify_hash(&self, password: String, hash: String) -> Result<bool, AuthError> {
        let pepper = self.config.password_pepper.clone();
        tokio::task::spawn_blocking(move || verify_password(&password, &hash, pepper.as_deref()))
            .await
            .map_err(|e| AuthError::Crypto(format!("verify task: {e}")))?
    }
}

#[async_trait]
impl<S> SessionVerifier for AuthService<S>
where
    S: CredentialStore,
{
    async fn verify(&self, token: &str) -> Result<AuthenticatedPrincipal, AuthError> {
        self.verify_at(token, Utc::now()).await
    }
}

fn required(value: &str, field: &str) -> Result<String, AuthError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AuthError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("  General  ", "name").unwrap(), "General");
        assert!(matches!(required("   ", "name"), Err(AuthError::Validation(_))));
    }

    #[test]
    fn optional_drops_blank_values() {
        assert_eq!(optional(Some("  ".into())), None);
        assert_eq!(optional(Some(" 12 Main St ".into())), Some("12 Main St".into()));
        assert_eq!(optional(None), None);
    }
}
