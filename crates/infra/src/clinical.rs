//! Clinical records (patients, appointments, prescriptions).
//!
//! The payload is opaque JSON; only the identity fields are interpreted here.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use carehub_core::{Entity, EntityKind, ExternalId, PrincipalId, TenantId, TenantOwned, TenantPublicId};

use crate::read_model::{ReadModelError, TenantStore};
use crate::sequence::{SequenceError, SequenceStore, TenantSequenceAllocator};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalRecord {
    pub id: ExternalId,
    pub tenant_id: TenantId,
    pub kind: EntityKind,
    pub payload: serde_json::Value,
    pub created_by: PrincipalId,
    pub created_at: DateTime<Utc>,
}

impl Entity for ClinicalRecord {
    type Id = ExternalId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TenantOwned for ClinicalRecord {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("payload must be a JSON object")]
    InvalidPayload,

    #[error(transparent)]
    Sequence(#[from] SequenceError),

    #[error(transparent)]
    Store(#[from] ReadModelError),
}

pub type RecordStore = Arc<dyn TenantStore<ClinicalRecord>>;

/// Creates records with freshly allocated identifiers and reads them back,
/// always within a single tenant.
pub struct ClinicalRecords<S> {
    allocator: TenantSequenceAllocator<S>,
    store: RecordStore,
}

impl<S> ClinicalRecords<S>
where
    S: SequenceStore,
{
    pub fn new(allocator: TenantSequenceAllocator<S>, store: RecordStore) -> Self {
        Self { allocator, store }
    }

    #[instrument(skip(self, payload), fields(tenant_id = %tenant_id, kind = %kind), err)]
    pub async fn create(
        &self,
        tenant_id: TenantId,
        public_id: TenantPublicId,
        kind: EntityKind,
        payload: serde_json::Value,
        created_by: PrincipalId,
    ) -> Result<ClinicalRecord, RecordError> {
        if !payload.is_object() {
            return Err(RecordError::InvalidPayload);
        }

        let id = self.allocator.next_external_id(tenant_id, public_id, kind).await?;
        let record = ClinicalRecord {
            id,
            tenant_id,
            kind,
            payload,
            created_by,
            created_at: Utc::now(),
        };
        self.store.insert(tenant_id, record.clone()).await?;
        tracing::info!(record_id = %id, "clinical record created");
        Ok(record)
    }

    /// Records of `kind` for the tenant, oldest first.
    pub async fn list(&self, tenant_id: TenantId, kind: EntityKind) -> Result<Vec<ClinicalRecord>, RecordError> {
        Ok(self.store.list(tenant_id, kind).await?)
    }

    /// `None` when the id is unknown, of another kind, or owned by another tenant.
    pub async fn get(
        &self,
        tenant_id: TenantId,
        kind: EntityKind,
        id: &ExternalId,
    ) -> Result<Option<ClinicalRecord>, RecordError> {
        if id.kind() != kind {
            return Ok(None);
        }
        Ok(self.store.get(tenant_id, id).await?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::read_model::InMemoryTenantStore;
    use crate::sequence::InMemorySequenceStore;

    fn records() -> ClinicalRecords<InMemorySequenceStore> {
        ClinicalRecords::new(
            TenantSequenceAllocator::new(InMemorySequenceStore::new()),
            Arc::new(InMemoryTenantStore::<ClinicalRecord>::new()),
        )
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids_per_kind() {
        let records = records();
        let (tenant, public, by) = (TenantId::new(), TenantPublicId::new(), PrincipalId::new());

        let p1 = records
            .create(tenant, public, EntityKind::Patient, json!({"name": "Ada"}), by)
            .await
            .unwrap();
        let a1 = records
            .create(tenant, public, EntityKind::Appointment, json!({}), by)
            .await
            .unwrap();
        let p2 = records
            .create(tenant, public, EntityKind::Patient, json!({"name": "Bo"}), by)
            .await
            .unwrap();

        assert_eq!(p1.id.to_string(), format!("{public}-P-1"));
        assert_eq!(a1.id.to_string(), format!("{public}-APT-1"));
        assert_eq!(p2.id.sequence(), 2);

        let patients = records.list(tenant, EntityKind::Patient).await.unwrap();
        assert_eq!(patients.iter().map(|r| r.id).collect::<Vec<_>>(), vec![p1.id, p2.id]);
    }

    #[tokio::test]
    async fn get_is_scoped_to_tenant_and_kind() {
        let records = records();
        let (a, b) = (TenantId::new(), TenantId::new());
        let public = TenantPublicId::new();
        let rec = records
            .create(a, public, EntityKind::Prescription, json!({"drug": "x"}), PrincipalId::new())
            .await
            .unwrap();

        assert!(records.get(a, EntityKind::Prescription, &rec.id).await.unwrap().is_some());
        assert!(records.get(b, EntityKind::Prescription, &rec.id).await.unwrap().is_none());
        assert!(records.get(a, EntityKind::Patient, &rec.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn non_object_payload_is_rejected_without_consuming_a_number() {
        let records = records();
        let (tenant, public) = (TenantId::new(), TenantPublicId::new());

        let err = records
            .create(tenant, public, EntityKind::Patient, json!([1, 2]), PrincipalId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RecordError::InvalidPayload));

        let ok = records
            .create(tenant, public, EntityKind::Patient, json!({}), PrincipalId::new())
            .await
            .unwrap();
        assert_eq!(ok.id.sequence(), 1);
    }

    #[tokio::test]
    async fn a_record_cannot_be_filed_under_another_tenant() {
        let store = Arc::new(InMemoryTenantStore::<ClinicalRecord>::new());
        let records = ClinicalRecords::new(TenantSequenceAllocator::new(InMemorySequenceStore::new()), store.clone());
        let (a, b) = (TenantId::new(), TenantId::new());
        let theirs = records
            .create(b, TenantPublicId::new(), EntityKind::Patient, json!({}), PrincipalId::new())
            .await
            .unwrap();

        let err = store.insert(a, theirs.clone()).await.unwrap_err();
        assert_eq!(err, ReadModelError::TenantMismatch { expected: a, found: b });
        assert!(records.get(a, EntityKind::Patient, &theirs.id).await.unwrap().is_none());
        assert!(records.list(a, EntityKind::Patient).await.unwrap().is_empty());
    }
}
