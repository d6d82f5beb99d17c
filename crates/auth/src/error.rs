use thiserror::Error;

use carehub_core::DomainError;

use crate::claims::TokenError;
use crate::store::{StoreError, UniqueField};

/// Failures of the authentication service.
///
/// Authorization (role) failures are a separate type: see [`crate::AuthzError`].
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{} is already registered", .0.as_str())]
    Conflict(UniqueField),

    /// Unknown email, wrong password, or deactivated account. Never more specific.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("hospital account is not activated")]
    TenantNotActive,

    #[error("invalid or already used activation token")]
    InvalidActivationToken,

    #[error(transparent)]
    Token(#[from] TokenError),

    /// Token was valid but its principal/tenant no longer back it.
    #[error("principal is no longer available")]
    PrincipalUnavailable,

    #[error("not found")]
    NotFound,

    #[error("credential store failure: {0}")]
    Store(StoreError),

    #[error("crypto failure: {0}")]
    Crypto(String),
}

impl AuthError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// True for failures that are the caller's fault rather than ours.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AuthError::Store(_) | AuthError::Crypto(_))
    }
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(field) => AuthError::Conflict(field),
            StoreError::NotFound => AuthError::NotFound,
            other => AuthError::Store(other),
        }
    }
}

impl From<DomainError> for AuthError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => AuthError::Validation(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_conflicts_keep_the_field() {
        let err: AuthError = StoreError::Conflict(UniqueField::LicenseNumber).into();
        assert!(matches!(err, AuthError::Conflict(UniqueField::LicenseNumber)));
        assert_eq!(err.to_string(), "license_number is already registered");
    }

    #[test]
    fn backend_failures_are_not_client_errors() {
        let err: AuthError = StoreError::Backend("connection reset".into()).into();
        assert!(!err.is_client_error());
        assert!(AuthError::InvalidCredentials.is_client_error());
    }

    #[test]
    fn domain_failures_become_validation_errors() {
        let err: AuthError = DomainError::validation("email is malformed").into();
        assert!(matches!(err, AuthError::Validation(ref m) if m == "email is malformed"));
        let err: AuthError = DomainError::invalid_id("PrincipalId: bad").into();
        assert!(matches!(err, AuthError::Validation(_)));
        assert!(err.is_client_error());
    }
}
