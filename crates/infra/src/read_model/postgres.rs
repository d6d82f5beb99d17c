//! Postgres-backed clinical record store.
//!
//! Every query includes `tenant_id` in the WHERE clause and the primary key is
//! `(tenant_id, id)`, so cross-tenant access is impossible by construction.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use carehub_core::{EntityKind, ExternalId, PrincipalId, TenantId};

use super::tenant_store::ensure_owner;
use super::{ReadModelError, TenantStore};
use crate::clinical::ClinicalRecord;

#[derive(Debug, Clone)]
pub struct PostgresRecordStore {
    pool: Arc<PgPool>,
}

impl PostgresRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

#[derive(Debug, FromRow)]
struct RecordRow {
    id: String,
    tenant_id: Uuid,
    payload: Json<serde_json::Value>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
}

impl TryFrom<RecordRow> for ClinicalRecord {
    type Error = ReadModelError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        let id: ExternalId = row
            .id
            .parse()
            .map_err(|_| ReadModelError::Backend(format!("undecodable record id {:?}", row.id)))?;
        Ok(ClinicalRecord {
            id,
            tenant_id: TenantId::from_uuid(row.tenant_id),
            kind: id.kind(),
            payload: row.payload.0,
            created_by: PrincipalId::from_uuid(row.created_by),
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl TenantStore<ClinicalRecord> for PostgresRecordStore {
    #[instrument(skip(self), fields(tenant_id = %tenant_id, record_id = %id), err)]
    async fn get(&self, tenant_id: TenantId, id: &ExternalId) -> Result<Option<ClinicalRecord>, ReadModelError> {
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, tenant_id, payload, created_by, created_at
            FROM clinical_records
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(id.to_string())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_record", e))?;

        row.map(ClinicalRecord::try_from).transpose()
    }

    #[instrument(skip(self, value), fields(tenant_id = %tenant_id, record_id = %value.id), err)]
    async fn insert(&self, tenant_id: TenantId, value: ClinicalRecord) -> Result<(), ReadModelError> {
        ensure_owner(tenant_id, &value)?;
        let id = value.id;
        let sequence = i64::try_from(id.sequence())
            .map_err(|_| ReadModelError::Backend(format!("sequence of {id} exceeds BIGINT")))?;

        sqlx::query(
            r#"
            INSERT INTO clinical_records (tenant_id, id, kind, sequence, payload, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(id.to_string())
        .bind(id.kind().tag())
        .bind(sequence)
        .bind(Json(&value.payload))
        .bind(value.created_by.as_uuid())
        .bind(value.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| match map_sqlx_error("insert_record", e) {
            ReadModelError::Duplicate(_) => ReadModelError::Duplicate(id.to_string()),
            other => other,
        })?;
        Ok(())
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, kind = %kind), err)]
    async fn list(&self, tenant_id: TenantId, kind: EntityKind) -> Result<Vec<ClinicalRecord>, ReadModelError> {
        let rows = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, tenant_id, payload, created_by, created_at
            FROM clinical_records
            WHERE tenant_id = $1 AND kind = $2
            ORDER BY sequence ASC
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(kind.tag())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_records", e))?;

        rows.into_iter().map(ClinicalRecord::try_from).collect()
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> ReadModelError {
    match err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            ReadModelError::Duplicate(String::new())
        }
        sqlx::Error::Database(db_err) => {
            ReadModelError::Backend(format!("database error in {operation}: {}", db_err.message()))
        }
        other => ReadModelError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}
