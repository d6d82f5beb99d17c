//! Postgres-backed sequence counters (`tenant_sequences` table).
//!
//! Allocation is one upsert statement, so the row lock taken by
//! `ON CONFLICT DO UPDATE` serializes concurrent callers per `(tenant, kind)`.
//!
//! | PostgreSQL Error Code | SequenceError |
//! |----------------------|---------------|
//! | `40001` serialization failure | `Contention` |
//! | `40P01` deadlock detected | `Contention` |
//! | `55P03` lock not available | `Contention` |
//! | anything else | `Backend` |

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use carehub_core::{EntityKind, TenantId};

use super::{SequenceError, SequenceStore};

#[derive(Debug, Clone)]
pub struct PostgresSequenceStore {
    pool: Arc<PgPool>,
}

impl PostgresSequenceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

#[async_trait]
impl SequenceStore for PostgresSequenceStore {
    #[instrument(skip(self), fields(tenant_id = %tenant_id, kind = %kind), err)]
    async fn increment(&self, tenant_id: TenantId, kind: EntityKind) -> Result<u64, SequenceError> {
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO tenant_sequences (tenant_id, kind, value)
            VALUES ($1, $2, 1)
            ON CONFLICT (tenant_id, kind)
            DO UPDATE SET value = tenant_sequences.value + 1
            RETURNING value
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(kind.tag())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("increment", e))?;

        to_u64(value)
    }

    #[instrument(skip(self), fields(tenant_id = %tenant_id, kind = %kind), err)]
    async fn current(&self, tenant_id: TenantId, kind: EntityKind) -> Result<u64, SequenceError> {
        let value: Option<i64> = sqlx::query_scalar(
            "SELECT value FROM tenant_sequences WHERE tenant_id = $1 AND kind = $2",
        )
        .bind(tenant_id.as_uuid())
        .bind(kind.tag())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("current", e))?;

        value.map_or(Ok(0), to_u64)
    }
}

fn to_u64(value: i64) -> Result<u64, SequenceError> {
    u64::try_from(value).map_err(|_| SequenceError::Backend(format!("negative sequence value {value}")))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> SequenceError {
    match err {
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            Some("40001" | "40P01" | "55P03") => SequenceError::Contention,
            _ => SequenceError::Backend(format!("database error in {operation}: {}", db_err.message())),
        },
        other => SequenceError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_counter_is_rejected() {
        assert_eq!(to_u64(7).unwrap(), 7);
        assert!(matches!(to_u64(-1), Err(SequenceError::Backend(_))));
    }
}
