use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use carehub_core::{EntityKind, TenantId};

use super::{SequenceError, SequenceStore};

/// In-memory counters for tests/dev. Fetch-and-increment under one lock.
#[derive(Debug, Default)]
pub struct InMemorySequenceStore {
    counters: Mutex<HashMap<(TenantId, EntityKind), u64>>,
}

impl InMemorySequenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SequenceStore for InMemorySequenceStore {
    async fn increment(&self, tenant_id: TenantId, kind: EntityKind) -> Result<u64, SequenceError> {
        let mut counters = self
            .counters
            .lock()
            .map_err(|_| SequenceError::Backend("lock poisoned".to_string()))?;
        let value = counters.entry((tenant_id, kind)).or_insert(0);
        *value += 1;
        Ok(*value)
    }

    async fn current(&self, tenant_id: TenantId, kind: EntityKind) -> Result<u64, SequenceError> {
        let counters = self
            .counters
            .lock()
            .map_err(|_| SequenceError::Backend("lock poisoned".to_string()))?;
        Ok(counters.get(&(tenant_id, kind)).copied().unwrap_or(0))
    }
}
