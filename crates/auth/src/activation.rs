//! Tenant activation: one-way `Pending → Active` via a single-use secret.
//!
//! The raw secret is handed to the registrant (activation link) exactly once.
//! Stores only ever see its SHA-256 digest, so a leaked tenants table cannot be
//! replayed against the activation endpoint.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Tenant lifecycle state. `Active` is terminal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationState {
    Pending,
    Active,
}

impl ActivationState {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivationState::Pending => "pending",
            ActivationState::Active => "active",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ActivationState::Pending),
            "active" => Some(ActivationState::Active),
            _ => None,
        }
    }
}

/// Raw single-use activation secret (256 bits, base64url without padding).
#[derive(Clone, PartialEq, Eq)]
pub struct ActivationSecret(String);

impl ActivationSecret {
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn digest(&self) -> ActivationDigest {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        ActivationDigest(hex::encode(hasher.finalize()))
    }
}

impl core::fmt::Debug for ActivationSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("ActivationSecret(..)")
    }
}

/// Hex-encoded SHA-256 of an [`ActivationSecret`]; the only form that is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivationDigest(String);

impl ActivationDigest {
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_are_url_safe_and_256_bit() {
        let secret = ActivationSecret::generate();
        assert_eq!(secret.expose().len(), 43);
        assert!(
            secret
                .expose()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_ne!(secret, ActivationSecret::generate());
    }

    #[test]
    fn digest_is_deterministic_and_does_not_contain_secret() {
        let secret = ActivationSecret::from_raw("abc");
        assert_eq!(secret.digest(), ActivationSecret::from_raw("abc").digest());
        assert_ne!(secret.digest(), ActivationSecret::from_raw("abd").digest());
        assert_eq!(secret.digest().as_str().len(), 64);
    }

    #[test]
    fn debug_never_prints_the_secret() {
        let secret = ActivationSecret::from_raw("super-secret");
        assert!(!format!("{secret:?}").contains("super-secret"));
    }
}
