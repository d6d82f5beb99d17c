use serde::{Deserialize, Serialize};

/// Staff role used for RBAC.
///
/// Closed set: authorization rules match on it exhaustively (see
/// [`crate::Operation::allowed_roles`]). The wire form is `SCREAMING_SNAKE_CASE`;
/// `HOSPITAL_ADMIN` is accepted as an alias of `ADMIN` for older clients.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[serde(alias = "HOSPITAL_ADMIN")]
    Admin,
    Doctor,
    Nurse,
    Pharmacist,
    Receptionist,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Doctor,
        Role::Nurse,
        Role::Pharmacist,
        Role::Receptionist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Doctor => "DOCTOR",
            Role::Nurse => "NURSE",
            Role::Pharmacist => "PHARMACIST",
            Role::Receptionist => "RECEPTIONIST",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" | "HOSPITAL_ADMIN" => Some(Role::Admin),
            "DOCTOR" => Some(Role::Doctor),
            "NURSE" => Some(Role::Nurse),
            "PHARMACIST" => Some(Role::Pharmacist),
            "RECEPTIONIST" => Some(Role::Receptionist),
            _ => None,
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_admin_spelling_is_accepted() {
        let role: Role = serde_json::from_str("\"HOSPITAL_ADMIN\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert_eq!(serde_json::to_string(&role).unwrap(), "\"ADMIN\"");
    }

    #[test]
    fn parse_matches_serde_names() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
        }
        assert_eq!(Role::parse("janitor"), None);
    }
}
