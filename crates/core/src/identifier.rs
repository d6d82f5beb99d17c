//! Human-readable, tenant-scoped record identifiers.
//!
//! An external identifier is `{tenant public id}-{kind tag}-{sequence}`, e.g.
//! `3f0c…-P-12`. The sequence number comes from the tenant sequence allocator;
//! formatting itself is pure and cannot fail.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::id::TenantPublicId;

/// Kinds of tenant-scoped records that receive sequential identifiers.
///
/// Each kind has its own counter per tenant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Patient,
    Appointment,
    Prescription,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Patient,
        EntityKind::Appointment,
        EntityKind::Prescription,
    ];

    /// Short tag embedded in external identifiers (also the counter key).
    pub fn tag(self) -> &'static str {
        match self {
            EntityKind::Patient => "P",
            EntityKind::Appointment => "APT",
            EntityKind::Prescription => "RX",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Patient => "patient",
            EntityKind::Appointment => "appointment",
            EntityKind::Prescription => "prescription",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External identifier of a tenant-scoped record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExternalId {
    tenant: TenantPublicId,
    kind: EntityKind,
    sequence: u64,
}

impl ExternalId {
    pub fn new(tenant: TenantPublicId, kind: EntityKind, sequence: u64) -> Self {
        Self {
            tenant,
            kind,
            sequence,
        }
    }

    pub fn tenant(&self) -> TenantPublicId {
        self.tenant
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl core::fmt::Display for ExternalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}-{}-{}", self.tenant, self.kind.tag(), self.sequence)
    }
}

impl FromStr for ExternalId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The public id itself contains hyphens, so split from the right.
        let mut parts = s.rsplitn(3, '-');
        let (Some(seq), Some(tag), Some(tenant)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(DomainError::invalid_id(format!("ExternalId: {s}")));
        };

        let kind = EntityKind::from_tag(tag)
            .ok_or_else(|| DomainError::invalid_id(format!("ExternalId: unknown kind tag '{tag}'")))?;
        let sequence = seq
            .parse::<u64>()
            .map_err(|e| DomainError::invalid_id(format!("ExternalId: {e}")))?;
        let tenant = tenant.parse::<TenantPublicId>()?;

        Ok(Self::new(tenant, kind, sequence))
    }
}

impl TryFrom<String> for ExternalId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ExternalId> for String {
    fn from(value: ExternalId) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    #[test]
    fn formats_patient_ids() {
        let public = TenantPublicId::from_uuid(
            Uuid::parse_str("6f1d2a4e-8c3b-4f7a-9e21-0b5c7d9e1f23").unwrap(),
        );
        let id = ExternalId::new(public, EntityKind::Patient, 5);
        assert_eq!(id.to_string(), "6f1d2a4e-8c3b-4f7a-9e21-0b5c7d9e1f23-P-5");
    }

    #[test]
    fn rejects_unknown_tags_and_bad_sequences() {
        let public = TenantPublicId::new();
        assert!(format!("{public}-X-1").parse::<ExternalId>().is_err());
        assert!(format!("{public}-P-").parse::<ExternalId>().is_err());
        assert!(format!("{public}-P--1").parse::<ExternalId>().is_err());
        assert!("P-1".parse::<ExternalId>().is_err());
    }

    #[test]
    fn tags_are_distinct() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_tag(kind.tag()), Some(kind));
        }
    }

    proptest! {
        #[test]
        fn parse_inverts_display(bytes in any::<[u8; 16]>(), seq in any::<u64>(), k in 0usize..3) {
            let id = ExternalId::new(
                TenantPublicId::from_uuid(Uuid::from_bytes(bytes)),
                EntityKind::ALL[k],
                seq,
            );
            let parsed: ExternalId = id.to_string().parse().unwrap();
            prop_assert_eq!(parsed, id);
        }
    }
}
