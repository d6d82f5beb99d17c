//! Per-tenant, per-kind sequence allocation for external identifiers.
//!
//! A [`SequenceStore`] owns one counter per `(TenantId, EntityKind)` and hands
//! out `last + 1` atomically. [`TenantSequenceAllocator`] wraps a store with a
//! bounded retry loop for transient contention and formats [`ExternalId`]s.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::instrument;

use carehub_core::{EntityKind, ExternalId, TenantId, TenantPublicId};

pub use in_memory::InMemorySequenceStore;
pub use postgres::PostgresSequenceStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SequenceError {
    /// Transient: the backend could not serialize concurrent increments.
    #[error("sequence allocation contended")]
    Contention,

    #[error("sequence backend error: {0}")]
    Backend(String),
}

/// Atomic counter storage.
///
/// `increment` must be a single atomic fetch-and-add: N concurrent callers for
/// the same pair observe exactly `{last+1..=last+N}`. Counters never go down.
#[async_trait]
pub trait SequenceStore: Send + Sync {
    /// Increment the `(tenant_id, kind)` counter (creating it at 0 first) and
    /// return the new value.
    async fn increment(&self, tenant_id: TenantId, kind: EntityKind) -> Result<u64, SequenceError>;

    /// Last value handed out, 0 if none.
    async fn current(&self, tenant_id: TenantId, kind: EntityKind) -> Result<u64, SequenceError>;
}

#[async_trait]
impl<S> SequenceStore for Arc<S>
where
    S: SequenceStore + ?Sized,
{
    async fn increment(&self, tenant_id: TenantId, kind: EntityKind) -> Result<u64, SequenceError> {
        (**self).increment(tenant_id, kind).await
    }

    async fn current(&self, tenant_id: TenantId, kind: EntityKind) -> Result<u64, SequenceError> {
        (**self).current(tenant_id, kind).await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_backoff: Duration::from_millis(5),
        }
    }
}

impl RetryPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        self.base_backoff.saturating_mul(1u32 << attempt.min(10))
    }
}

#[derive(Debug)]
pub struct TenantSequenceAllocator<S> {
    store: S,
    policy: RetryPolicy,
}

impl<S> TenantSequenceAllocator<S>
where
    S: SequenceStore,
{
    pub fn new(store: S) -> Self {
        Self::with_policy(store, RetryPolicy::default())
    }

    pub fn with_policy(store: S, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    /// Next sequence number for `(tenant_id, kind)`.
    ///
    /// Retries `Contention` up to `max_retries` times with exponential backoff;
    /// backend errors are returned immediately.
    #[instrument(skip(self), fields(tenant_id = %tenant_id, kind = %kind), err)]
    pub async fn next(&self, tenant_id: TenantId, kind: EntityKind) -> Result<u64, SequenceError> {
        let mut attempt = 0;
        loop {
            match self.store.increment(tenant_id, kind).await {
                Err(SequenceError::Contention) if attempt < self.policy.max_retries => {
                    tracing::debug!(attempt, "sequence contention, retrying");
                    tokio::time::sleep(self.policy.backoff(attempt)).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// Allocate and format the next external identifier.
    pub async fn next_external_id(
        &self,
        tenant_id: TenantId,
        public_id: TenantPublicId,
        kind: EntityKind,
    ) -> Result<ExternalId, SequenceError> {
        let n = self.next(tenant_id, kind).await?;
        Ok(ExternalId::new(public_id, kind, n))
    }

    pub async fn current(&self, tenant_id: TenantId, kind: EntityKind) -> Result<u64, SequenceError> {
        self.store.current(tenant_id, kind).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    /// Fails with `Contention` a fixed number of times, then delegates.
    struct Flaky {
        failures_left: AtomicU32,
        calls: AtomicU32,
        inner: InMemorySequenceStore,
    }

    impl Flaky {
        fn new(failures: u32) -> Self {
            Self {
                failures_left: AtomicU32::new(failures),
                calls: AtomicU32::new(0),
                inner: InMemorySequenceStore::new(),
            }
        }
    }

    #[async_trait]
    impl SequenceStore for Flaky {
        async fn increment(&self, tenant_id: TenantId, kind: EntityKind) -> Result<u64, SequenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(SequenceError::Contention);
            }
            self.inner.increment(tenant_id, kind).await
        }

        async fn current(&self, tenant_id: TenantId, kind: EntityKind) -> Result<u64, SequenceError> {
            self.inner.current(tenant_id, kind).await
        }
    }

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_backoff: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn transient_contention_is_retried() {
        let store = Arc::new(Flaky::new(2));
        let allocator = TenantSequenceAllocator::with_policy(store.clone(), fast_policy(5));
        let n = allocator.next(TenantId::new(), EntityKind::Patient).await.unwrap();
        assert_eq!(n, 1);
        assert_eq!(store.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn contention_surfaces_after_bounded_retries() {
        let store = Arc::new(Flaky::new(100));
        let allocator = TenantSequenceAllocator::with_policy(store.clone(), fast_policy(3));
        let err = allocator.next(TenantId::new(), EntityKind::Patient).await.unwrap_err();
        assert_eq!(err, SequenceError::Contention);
        assert_eq!(store.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn external_ids_carry_tenant_public_id_and_tag() {
        let allocator = TenantSequenceAllocator::new(InMemorySequenceStore::new());
        let (tenant, public) = (TenantId::new(), TenantPublicId::new());

        let first = allocator.next_external_id(tenant, public, EntityKind::Prescription).await.unwrap();
        let second = allocator.next_external_id(tenant, public, EntityKind::Prescription).await.unwrap();

        assert_eq!(first.to_string(), format!("{public}-RX-1"));
        assert_eq!(second.sequence(), 2);
        assert_eq!(allocator.current(tenant, EntityKind::Prescription).await.unwrap(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_get_a_gapless_range() {
        let allocator = Arc::new(TenantSequenceAllocator::new(InMemorySequenceStore::new()));
        let tenant = TenantId::new();

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let allocator = allocator.clone();
                tokio::spawn(async move { allocator.next(tenant, EntityKind::Appointment).await })
            })
            .collect();

        let mut values = Vec::new();
        for h in handles {
            values.push(h.await.unwrap().unwrap());
        }
        values.sort_unstable();
        assert_eq!(values, (1..=64).collect::<Vec<u64>>());
    }

    #[test]
    fn backoff_doubles() {
        let policy = fast_policy(5);
        assert_eq!(policy.backoff(0), Duration::from_millis(1));
        assert_eq!(policy.backoff(3), Duration::from_millis(8));
    }
}
