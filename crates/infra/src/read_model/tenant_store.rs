use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use carehub_core::{EntityKind, ExternalId, TenantId, TenantOwned};

use super::ReadModelError;

/// Tenant-isolated storage of entities keyed by their external id.
///
/// Every call takes the `TenantId` explicitly; an id of tenant B looked up with
/// tenant A is simply absent.
#[async_trait]
pub trait TenantStore<V>: Send + Sync
where
    V: TenantOwned<Id = ExternalId> + Send + 'static,
{
    async fn get(&self, tenant_id: TenantId, id: &ExternalId) -> Result<Option<V>, ReadModelError>;

    /// Insert a new value under `tenant_id`.
    ///
    /// A value owned by another tenant is a `TenantMismatch`; an existing id
    /// is a `Duplicate`.
    async fn insert(&self, tenant_id: TenantId, value: V) -> Result<(), ReadModelError>;

    /// Values of `kind`, ascending by sequence number.
    async fn list(&self, tenant_id: TenantId, kind: EntityKind) -> Result<Vec<V>, ReadModelError>;
}

#[async_trait]
impl<V, S> TenantStore<V> for Arc<S>
where
    V: TenantOwned<Id = ExternalId> + Send + 'static,
    S: TenantStore<V> + ?Sized,
{
    async fn get(&self, tenant_id: TenantId, id: &ExternalId) -> Result<Option<V>, ReadModelError> {
        (**self).get(tenant_id, id).await
    }

    async fn insert(&self, tenant_id: TenantId, value: V) -> Result<(), ReadModelError> {
        (**self).insert(tenant_id, value).await
    }

    async fn list(&self, tenant_id: TenantId, kind: EntityKind) -> Result<Vec<V>, ReadModelError> {
        (**self).list(tenant_id, kind).await
    }
}

/// Refuse a write whose value claims a tenant other than the one it is filed under.
pub(crate) fn ensure_owner<V: TenantOwned>(tenant_id: TenantId, value: &V) -> Result<(), ReadModelError> {
    let owner = value.tenant_id();
    if owner != tenant_id {
        return Err(ReadModelError::TenantMismatch {
            expected: tenant_id,
            found: owner,
        });
    }
    Ok(())
}

/// In-memory tenant-isolated store for tests/dev.
#[derive(Debug)]
pub struct InMemoryTenantStore<V> {
    inner: RwLock<HashMap<TenantId, Vec<V>>>,
}

impl<V> InMemoryTenantStore<V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<V> Default for InMemoryTenantStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V> TenantStore<V> for InMemoryTenantStore<V>
where
    V: TenantOwned<Id = ExternalId> + Clone + Send + Sync + 'static,
{
    async fn get(&self, tenant_id: TenantId, id: &ExternalId) -> Result<Option<V>, ReadModelError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map
            .get(&tenant_id)
            .and_then(|rows| rows.iter().find(|v| v.id() == id))
            .cloned())
    }

    async fn insert(&self, tenant_id: TenantId, value: V) -> Result<(), ReadModelError> {
        ensure_owner(tenant_id, &value)?;

        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let rows = map.entry(tenant_id).or_default();
        if rows.iter().any(|v| v.id() == value.id()) {
            return Err(ReadModelError::Duplicate(value.id().to_string()));
        }
        rows.push(value);
        Ok(())
    }

    async fn list(&self, tenant_id: TenantId, kind: EntityKind) -> Result<Vec<V>, ReadModelError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let mut values: Vec<V> = map
            .get(&tenant_id)
            .map(|rows| rows.iter().filter(|v| v.id().kind() == kind).cloned().collect())
            .unwrap_or_default();
        values.sort_by_key(|v| v.id().sequence());
        Ok(values)
    }
}

fn poisoned() -> ReadModelError {
    ReadModelError::Backend("lock poisoned".to_string())
}

#[cfg(test)]
mod tests {
    use carehub_core::{Entity, TenantPublicId};

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: ExternalId,
        tenant_id: TenantId,
        value: u32,
    }

    impl Entity for Row {
        type Id = ExternalId;

        fn id(&self) -> &ExternalId {
            &self.id
        }
    }

    impl TenantOwned for Row {
        fn tenant_id(&self) -> TenantId {
            self.tenant_id
        }
    }

    fn row(tenant_id: TenantId, kind: EntityKind, sequence: u64, value: u32) -> Row {
        Row {
            id: ExternalId::new(TenantPublicId::new(), kind, sequence),
            tenant_id,
            value,
        }
    }

    #[tokio::test]
    async fn tenants_never_see_each_others_rows() {
        let store = InMemoryTenantStore::<Row>::new();
        let (a, b) = (TenantId::new(), TenantId::new());
        let ra = row(a, EntityKind::Patient, 1, 1);
        let rb = row(b, EntityKind::Patient, 1, 2);

        store.insert(a, ra.clone()).await.unwrap();
        store.insert(b, rb.clone()).await.unwrap();

        assert_eq!(store.get(a, &ra.id).await.unwrap(), Some(ra.clone()));
        assert_eq!(store.get(b, &ra.id).await.unwrap(), None);
        assert_eq!(store.list(a, EntityKind::Patient).await.unwrap(), vec![ra]);
        assert!(store.list(TenantId::new(), EntityKind::Patient).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn writes_claiming_another_tenant_are_refused() {
        let store = InMemoryTenantStore::<Row>::new();
        let (a, b) = (TenantId::new(), TenantId::new());
        let foreign = row(b, EntityKind::Prescription, 1, 7);

        let err = store.insert(a, foreign.clone()).await.unwrap_err();
        assert_eq!(err, ReadModelError::TenantMismatch { expected: a, found: b });

        assert_eq!(store.get(a, &foreign.id).await.unwrap(), None);
        assert!(store.list(a, EntityKind::Prescription).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected_within_a_tenant() {
        let store = InMemoryTenantStore::<Row>::new();
        let t = TenantId::new();
        let first = row(t, EntityKind::Patient, 1, 1);
        let again = Row { value: 2, ..first.clone() };

        store.insert(t, first.clone()).await.unwrap();
        let err = store.insert(t, again).await.unwrap_err();
        assert!(matches!(err, ReadModelError::Duplicate(k) if k == first.id.to_string()));
        assert_eq!(store.list(t, EntityKind::Patient).await.unwrap(), vec![first]);
    }

    #[tokio::test]
    async fn list_filters_by_kind_and_orders_by_sequence() {
        let store = InMemoryTenantStore::<Row>::new();
        let t = TenantId::new();
        for (kind, seq) in [
            (EntityKind::Patient, 2),
            (EntityKind::Appointment, 1),
            (EntityKind::Patient, 1),
        ] {
            store.insert(t, row(t, kind, seq, seq as u32)).await.unwrap();
        }

        let patients = store.list(t, EntityKind::Patient).await.unwrap();
        assert_eq!(patients.iter().map(|r| r.id.sequence()).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(store.list(t, EntityKind::Appointment).await.unwrap().len(), 1);
    }
}
