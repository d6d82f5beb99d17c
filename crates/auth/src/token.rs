//! Session token issuance and signature verification (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use carehub_core::{PrincipalId, TenantId};

use crate::claims::{validate_claims, SessionClaims, TokenError};
use crate::error::AuthError;
use crate::Role;

/// A freshly signed session token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies session tokens with a process-wide secret.
///
/// The key comes from configuration only; nothing in a request can influence it.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl core::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenIssuer").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Sign a token for `principal_id` in `tenant_id`, valid for the configured TTL.
    pub fn issue(
        &self,
        principal_id: PrincipalId,
        tenant_id: TenantId,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::Crypto("session expiry out of range".to_string()))?;
        let claims = SessionClaims {
            sub: principal_id,
            tenant_id,
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        if claims.exp <= claims.iat {
            return Err(AuthError::Crypto("session ttl must be positive".to_string()));
        }

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Check signature and expiry; returns the (not yet store-confirmed) claims.
    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);

        let claims = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })?;

        validate_claims(&claims, now)?;
        Ok(claims)
    }
}
