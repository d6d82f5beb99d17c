//! Tenant-isolated record storage abstractions.

pub mod postgres;
pub mod tenant_store;

use thiserror::Error;

use carehub_core::TenantId;

pub use postgres::PostgresRecordStore;
pub use tenant_store::{InMemoryTenantStore, TenantStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReadModelError {
    #[error("record {0} already exists")]
    Duplicate(String),

    #[error("record owned by tenant {found} cannot be stored under tenant {expected}")]
    TenantMismatch { expected: TenantId, found: TenantId },

    #[error("read model backend error: {0}")]
    Backend(String),
}
