use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use carehub_auth::{LoginOutcome, NewStaff, RegisterTenant, Role, Tenant};
use carehub_core::{EntityKind, PrincipalId, TenantId, TenantPublicId};
use carehub_infra::clinical::ClinicalRecord;

// -------------------------
// Request DTOs
// -------------------------
//
// None of these carry a tenant id: tenant scope comes from the session token.

#[derive(Debug, Deserialize)]
pub struct RegisterHospitalRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(alias = "licenseNumber")]
    pub license_number: String,
    pub password: String,
}

impl From<RegisterHospitalRequest> for RegisterTenant {
    fn from(r: RegisterHospitalRequest) -> Self {
        RegisterTenant {
            name: r.name,
            email: r.email,
            phone: r.phone,
            address: r.address,
            license_number: r.license_number,
            password: r.password,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateStaffRequest {
    pub email: String,
    pub password: String,
    #[serde(alias = "firstName")]
    pub first_name: String,
    #[serde(alias = "lastName")]
    pub last_name: String,
    pub role: Role,
    pub department: Option<String>,
    pub specialization: Option<String>,
}

impl From<CreateStaffRequest> for NewStaff {
    fn from(r: CreateStaffRequest) -> Self {
        NewStaff {
            email: r.email,
            password: r.password,
            first_name: r.first_name,
            last_name: r.last_name,
            role: r.role,
            department: r.department,
            specialization: r.specialization,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RbacCheckQuery {
    pub operation: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct RegisterHospitalResponse {
    pub message: &'static str,
    pub activation_link: String,
    pub tenant_id: TenantId,
    pub public_id: TenantPublicId,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub principal_id: PrincipalId,
    pub name: String,
    pub role: Role,
    pub hospital_name: String,
    pub hospital_public_id: TenantPublicId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(o: LoginOutcome) -> Self {
        LoginResponse {
            principal_id: o.principal_id,
            name: o.name,
            role: o.role,
            hospital_name: o.hospital_name,
            hospital_public_id: o.hospital_public_id,
            token: o.token,
            expires_at: o.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HospitalResponse {
    pub id: TenantId,
    pub public_id: TenantPublicId,
    pub name: String,
    pub email: String,
    pub license_number: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub state: &'static str,
    pub created_at: DateTime<Utc>,
}

impl From<Tenant> for HospitalResponse {
    fn from(t: Tenant) -> Self {
        HospitalResponse {
            id: t.id,
            public_id: t.public_id,
            name: t.name,
            email: t.email.as_str().to_string(),
            license_number: t.license_number.as_str().to_string(),
            phone: t.phone,
            address: t.address,
            state: t.state.as_str(),
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecordCreatedResponse {
    pub id: String,
    pub kind: EntityKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub id: String,
    pub kind: EntityKind,
    pub payload: serde_json::Value,
    pub created_by: PrincipalId,
    pub created_at: DateTime<Utc>,
}

impl From<ClinicalRecord> for RecordResponse {
    fn from(r: ClinicalRecord) -> Self {
        RecordResponse {
            id: r.id.to_string(),
            kind: r.kind,
            payload: r.payload,
            created_by: r.created_by,
            created_at: r.created_at,
        }
    }
}
