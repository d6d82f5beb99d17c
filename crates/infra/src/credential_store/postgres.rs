//! Postgres-backed credential store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict(field)` derived from the constraint name |
//! | Database (foreign key violation) | `23503` | `NotFound` (principal inserted into unknown tenant) |
//! | Anything else | - | `Backend` |
//!
//! Rows that cannot be decoded into domain types (unknown role, malformed
//! email) are reported as `Backend`: they indicate a corrupted table, not a
//! caller mistake.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use carehub_auth::{ActivationDigest, ActivationState, CredentialStore, Principal, Role, StoreError, Tenant, UniqueField};
use carehub_core::{Email, LicenseNumber, PrincipalId, TenantId, TenantPublicId};

const TENANT_COLUMNS: &str = "id, public_id, name, email, license_number, phone, address, state, activation_digest, created_at";
const PRINCIPAL_COLUMNS: &str = "id, tenant_id, email, first_name, last_name, password_hash, role, active, department, specialization, created_at";

#[derive(Debug, Clone)]
pub struct PostgresCredentialStore {
    pool: Arc<PgPool>,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    #[instrument(skip_all, fields(tenant_id = %tenant.id), err)]
    async fn create_tenant_with_admin(&self, tenant: Tenant, admin: Principal) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_registration", e))?;

        sqlx::query(
            r#"
            INSERT INTO tenants (
                id, public_id, name, email, license_number, phone, address,
                state, activation_digest, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(tenant.id.as_uuid())
        .bind(tenant.public_id.as_uuid())
        .bind(&tenant.name)
        .bind(tenant.email.as_str())
        .bind(tenant.license_number.as_str())
        .bind(&tenant.phone)
        .bind(&tenant.address)
        .bind(tenant.state.as_str())
        .bind(tenant.activation_digest.as_ref().map(|d| d.as_str()))
        .bind(tenant.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_tenant", e))?;

        insert_principal_row(&mut tx, &admin).await?;

        // Dropping `tx` on any error above rolls the tenant insert back.
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_registration", e))
    }

    #[instrument(skip_all, err)]
    async fn activate_tenant(&self, digest: &ActivationDigest) -> Result<Option<Tenant>, StoreError> {
        let sql = format!(
            "UPDATE tenants SET state = 'active', activation_digest = NULL \
             WHERE activation_digest = $1 AND state = 'pending' \
             RETURNING {TENANT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, TenantRow>(&sql)
            .bind(digest.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("activate_tenant", e))?;

        row.map(Tenant::try_from).transpose()
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id), err)]
    async fn get_tenant(&self, tenant_id: TenantId) -> Result<Option<Tenant>, StoreError> {
        let sql = format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE id = $1");
        let row = sqlx::query_as::<_, TenantRow>(&sql)
            .bind(tenant_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_tenant", e))?;

        row.map(Tenant::try_from).transpose()
    }

    #[instrument(skip(self), fields(principal_id = %principal_id), err)]
    async fn get_principal(&self, principal_id: PrincipalId) -> Result<Option<Principal>, StoreError> {
        let sql = format!("SELECT {PRINCIPAL_COLUMNS} FROM principals WHERE id = $1");
        let row = sqlx::query_as::<_, PrincipalRow>(&sql)
            .bind(principal_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_principal", e))?;

        row.map(Principal::try_from).transpose()
    }

    #[instrument(skip_all, err)]
    async fn find_principal_by_email(&self, email: &Email) -> Result<Option<Principal>, StoreError> {
        let sql = format!("SELECT {PRINCIPAL_COLUMNS} FROM principals WHERE email = $1");
        let row = sqlx::query_as::<_, PrincipalRow>(&sql)
            .bind(email.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_principal_by_email", e))?;

        row.map(Principal::try_from).transpose()
    }

    #[instrument(skip_all, fields(tenant_id = %principal.tenant_id), err)]
    async fn insert_principal(&self, principal: Principal) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_insert_principal", e))?;
        insert_principal_row(&mut tx, &principal).await?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_insert_principal", e))
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id), err)]
    async fn list_principals(&self, tenant_id: TenantId) -> Result<Vec<Principal>, StoreError> {
        let sql = format!(
            "SELECT {PRINCIPAL_COLUMNS} FROM principals WHERE tenant_id = $1 ORDER BY created_at ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, PrincipalRow>(&sql)
            .bind(tenant_id.as_uuid())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_principals", e))?;

        rows.into_iter().map(Principal::try_from).collect()
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, principal_id = %principal_id), err)]
    async fn set_principal_active(
        &self,
        tenant_id: TenantId,
        principal_id: PrincipalId,
        active: bool,
    ) -> Result<Option<Principal>, StoreError> {
        let sql = format!(
            "UPDATE principals SET active = $3 WHERE tenant_id = $1 AND id = $2 RETURNING {PRINCIPAL_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PrincipalRow>(&sql)
            .bind(tenant_id.as_uuid())
            .bind(principal_id.as_uuid())
            .bind(active)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_principal_active", e))?;

        row.map(Principal::try_from).transpose()
    }
}

async fn insert_principal_row(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    principal: &Principal,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO principals (
            id, tenant_id, email, first_name, last_name, password_hash,
            role, active, department, specialization, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(principal.id.as_uuid())
    .bind(principal.tenant_id.as_uuid())
    .bind(principal.email.as_str())
    .bind(&principal.first_name)
    .bind(&principal.last_name)
    .bind(&principal.password_hash)
    .bind(principal.role.as_str())
    .bind(principal.active)
    .bind(&principal.department)
    .bind(&principal.specialization)
    .bind(principal.created_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_principal", e))?;
    Ok(())
}

#[derive(Debug, FromRow)]
struct TenantRow {
    id: Uuid,
    public_id: Uuid,
    name: String,
    email: String,
    license_number: String,
    phone: Option<String>,
    address: Option<String>,
    state: String,
    activation_digest: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<TenantRow> for Tenant {
    type Error = StoreError;

    fn try_from(row: TenantRow) -> Result<Self, Self::Error> {
        let state = ActivationState::parse(&row.state)
            .ok_or_else(|| corrupt("tenants.state", &row.state))?;
        Ok(Tenant {
            id: TenantId::from_uuid(row.id),
            public_id: TenantPublicId::from_uuid(row.public_id),
            name: row.name,
            email: Email::parse(&row.email).map_err(|_| corrupt("tenants.email", &row.email))?,
            license_number: LicenseNumber::parse(&row.license_number)
                .map_err(|_| corrupt("tenants.license_number", &row.license_number))?,
            phone: row.phone,
            address: row.address,
            state,
            activation_digest: row.activation_digest.map(ActivationDigest::from_hex),
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct PrincipalRow {
    id: Uuid,
    tenant_id: Uuid,
    email: String,
    first_name: String,
    last_name: String,
    password_hash: String,
    role: String,
    active: bool,
    department: Option<String>,
    specialization: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PrincipalRow> for Principal {
    type Error = StoreError;

    fn try_from(row: PrincipalRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role).ok_or_else(|| corrupt("principals.role", &row.role))?;
        Ok(Principal {
            id: PrincipalId::from_uuid(row.id),
            tenant_id: TenantId::from_uuid(row.tenant_id),
            email: Email::parse(&row.email).map_err(|_| corrupt("principals.email", &row.email))?,
            first_name: row.first_name,
            last_name: row.last_name,
            password_hash: row.password_hash,
            role,
            active: row.active,
            department: row.department,
            specialization: row.specialization,
            created_at: row.created_at,
        })
    }
}

fn corrupt(column: &str, value: &str) -> StoreError {
    StoreError::Backend(format!("undecodable value in {column}: {value:?}"))
}

/// Map a unique-constraint name to the attribute it protects.
fn conflict_field(constraint: Option<&str>) -> UniqueField {
    match constraint {
        Some(c) if c.contains("license") => UniqueField::LicenseNumber,
        Some(c) if c.contains("public_id") => UniqueField::PublicId,
        _ => UniqueField::Email,
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some("23505") => StoreError::Conflict(conflict_field(db_err.constraint())),
            Some("23503") => StoreError::NotFound,
            _ => StoreError::Backend(format!("database error in {operation}: {}", db_err.message())),
        },
        sqlx::Error::PoolClosed => StoreError::Backend(format!("connection pool closed in {operation}")),
        other => StoreError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_names_map_to_fields() {
        assert_eq!(conflict_field(Some("tenants_license_number_key")), UniqueField::LicenseNumber);
        assert_eq!(conflict_field(Some("tenants_public_id_key")), UniqueField::PublicId);
        assert_eq!(conflict_field(Some("principals_email_key")), UniqueField::Email);
        assert_eq!(conflict_field(None), UniqueField::Email);
    }

    #[test]
    fn unknown_role_row_is_a_backend_error() {
        let row = PrincipalRow {
            id: Uuid::now_v7(),
            tenant_id: Uuid::now_v7(),
            email: "a@x.com".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            password_hash: "h".into(),
            role: "JANITOR".into(),
            active: true,
            department: None,
            specialization: None,
            created_at: Utc::now(),
        };
        assert!(matches!(Principal::try_from(row), Err(StoreError::Backend(_))));
    }
}
