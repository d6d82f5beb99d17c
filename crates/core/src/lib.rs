//! `carehub-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod identifier;
pub mod value_object;

pub use entity::{Entity, TenantOwned};
pub use error::DomainError;
pub use id::{PrincipalId, TenantId, TenantPublicId};
pub use identifier::{EntityKind, ExternalId};
pub use value_object::{Email, LicenseNumber};
