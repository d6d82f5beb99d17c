use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use carehub_core::{Email, PrincipalId, TenantId};

use crate::Role;

/// A staff account (human user) belonging to exactly one tenant.
///
/// # Invariants
/// - `tenant_id` is set at creation and never reassigned.
/// - `email` is globally unique across tenants (login is tenant-less).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: PrincipalId,
    pub tenant_id: TenantId,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
    pub department: Option<String>,
    pub specialization: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Principal {
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        name.trim().to_string()
    }

    /// The principal as exposed to API callers (no credential material).
    pub fn summary(&self) -> PrincipalSummary {
        PrincipalSummary {
            id: self.id,
            email: self.email.clone(),
            name: self.display_name(),
            role: self.role,
            active: self.active,
            department: self.department.clone(),
            specialization: self.specialization.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalSummary {
    pub id: PrincipalId,
    pub email: Email,
    pub name: String,
    pub role: Role,
    pub active: bool,
    pub department: Option<String>,
    pub specialization: Option<String>,
}

/// A principal whose session token was verified against the credential store.
///
/// `tenant_id` here is the only tenant scope downstream code may use.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    pub principal_id: PrincipalId,
    pub tenant_id: TenantId,
    pub role: Role,
}
