use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use carehub_core::{PrincipalId, TenantId};

use crate::Role;

/// Session token claims.
///
/// Timestamps are Unix seconds so the JWT library can enforce `exp` itself.
/// `tenant_id` and `role` are a fast-path hint only: verification re-reads
/// the principal and tenant from the credential store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject / principal identifier.
    pub sub: PrincipalId,

    /// Tenant the principal belongs to.
    pub tenant_id: TenantId,

    /// Role at issuance time.
    pub role: Role,

    /// Issued-at (Unix seconds).
    pub iat: i64,

    /// Expiration (Unix seconds).
    pub exp: i64,
}

impl SessionClaims {
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token is malformed")]
    Malformed,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate the time window of session claims.
///
/// Signature verification happens in [`crate::token::TokenIssuer::decode`];
/// this only checks the claims against `now`.
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenError> {
    if claims.exp <= claims.iat {
        return Err(TokenError::InvalidTimeWindow);
    }
    let now = now.timestamp();
    if now < claims.iat {
        return Err(TokenError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn claims(iat: i64, exp: i64) -> SessionClaims {
        SessionClaims {
            sub: PrincipalId::new(),
            tenant_id: TenantId::new(),
            role: Role::Doctor,
            iat,
            exp,
        }
    }

    #[test]
    fn expiry_is_exclusive() {
        let now = Utc::now();
        let c = claims(now.timestamp() - 10, now.timestamp());
        assert_eq!(validate_claims(&c, now), Err(TokenError::Expired));
    }

    #[test]
    fn future_issuance_is_rejected() {
        let now = Utc::now();
        let c = claims((now + Duration::minutes(5)).timestamp(), (now + Duration::hours(1)).timestamp());
        assert_eq!(validate_claims(&c, now), Err(TokenError::NotYetValid));
    }

    proptest! {
        #[test]
        fn valid_only_inside_window(iat in 0i64..1_000_000, len in 1i64..100_000, offset in -10i64..200_000) {
            let c = claims(iat, iat + len);
            let now = DateTime::from_timestamp(iat + offset, 0).unwrap();
            let inside = offset >= 0 && offset < len;
            prop_assert_eq!(validate_claims(&c, now).is_ok(), inside);
        }
    }
}
