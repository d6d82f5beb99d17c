use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use carehub_core::{Email, LicenseNumber, TenantId, TenantPublicId};

use crate::activation::{ActivationDigest, ActivationState};

/// An onboarded hospital; the unit of data isolation.
///
/// # Invariants
/// - `email`, `license_number` and `public_id` are globally unique.
/// - `public_id` never changes after creation.
/// - `activation_digest` is `Some` iff `state == Pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub public_id: TenantPublicId,
    pub name: String,
    pub email: Email,
    pub license_number: LicenseNumber,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub state: ActivationState,
    #[serde(skip_serializing)]
    pub activation_digest: Option<ActivationDigest>,
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    pub fn is_active(&self) -> bool {
        self.state == ActivationState::Active
    }
}
