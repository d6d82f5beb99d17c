//! `carehub-auth`: authentication and authorization boundary.
//!
//! Decoupled from HTTP and storage: persistence comes in through the
//! [`CredentialStore`] trait, transport through whatever calls [`AuthService`].

pub mod activation;
pub mod authorize;
pub mod claims;
pub mod config;
pub mod error;
pub mod notifier;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod service;
pub mod store;
pub mod tenant;
pub mod token;

pub use activation::{ActivationDigest, ActivationSecret, ActivationState};
pub use authorize::{
    authorize, explain_authorization, operation_table, AuthorizationExplanation, AuthzError, OperationGrant,
};
pub use claims::{validate_claims, SessionClaims, TokenError};
pub use config::AuthConfig;
pub use error::AuthError;
pub use notifier::{ActivationNotice, ActivationNotifier, TracingNotifier};
pub use permissions::Operation;
pub use principal::{AuthenticatedPrincipal, Principal, PrincipalSummary};
pub use roles::Role;
pub use service::{ActivationReference, AuthService, LoginOutcome, NewStaff, RegisterTenant, SessionVerifier};
pub use store::{CredentialStore, StoreError, UniqueField};
pub use tenant::Tenant;
pub use token::{IssuedToken, TokenIssuer};
