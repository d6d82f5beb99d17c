//! Entity traits: identity + tenant ownership.

use crate::id::TenantId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// An entity owned by exactly one tenant.
///
/// The owning tenant is fixed at creation. Tenant-scoped stores refuse a write
/// whose value names a different tenant than the call's tenant argument.
pub trait TenantOwned: Entity {
    fn tenant_id(&self) -> TenantId;
}
