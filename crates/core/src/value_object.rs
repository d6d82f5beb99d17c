//! Value objects: equality by value, not identity.
//!
//! The credential-bearing strings of the system (emails, license numbers) are
//! normalized once at the boundary so uniqueness checks in every store compare
//! the same canonical form.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A normalized (trimmed, lowercased) email address.
///
/// Emails are globally unique across tenants, which is what makes tenant-less
/// login possible.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let normalized = raw.trim().to_lowercase();
        let Some((local, domain)) = normalized.split_once('@') else {
            return Err(DomainError::validation("email must contain '@'"));
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(DomainError::validation("email is malformed"));
        }
        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(DomainError::validation("email domain is malformed"));
        }
        if normalized.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("email must not contain whitespace"));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl core::fmt::Display for Email {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A hospital license number (trimmed; compared case-sensitively as issued).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LicenseNumber(String);

impl LicenseNumber {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("license number is required"));
        }
        if trimmed.len() > 64 {
            return Err(DomainError::validation("license number is too long"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LicenseNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LicenseNumber> for String {
    fn from(value: LicenseNumber) -> Self {
        value.0
    }
}

impl core::fmt::Display for LicenseNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized() {
        let email = Email::parse("  Admin@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "admin@example.com");
        assert_eq!(email, Email::parse("admin@example.com").unwrap());
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for raw in ["", "no-at-sign", "@x.com", "a@", "a@b", "a@@b.com", "a b@x.com", "a@.com"] {
            assert!(Email::parse(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn license_number_is_trimmed_and_required() {
        assert_eq!(LicenseNumber::parse(" L1 ").unwrap().as_str(), "L1");
        assert!(LicenseNumber::parse("   ").is_err());
    }

    #[test]
    fn email_deserializes_through_validation() {
        let ok: Email = serde_json::from_str("\"A@X.com\"").unwrap();
        assert_eq!(ok.as_str(), "a@x.com");
        assert!(serde_json::from_str::<Email>("\"bogus\"").is_err());
    }
}
