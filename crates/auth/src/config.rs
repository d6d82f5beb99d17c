/// Runtime knobs of [`crate::AuthService`].
///
/// Built by the API from environment configuration; the JWT secret itself is
/// held by the [`crate::TokenIssuer`], not here.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub password_pepper: Option<String>,
    pub min_password_length: usize,
    /// Base used to build activation links, without trailing slash.
    pub public_base_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password_pepper: None,
            min_password_length: 8,
            public_base_url: "http://localhost:8080".to_string(),
        }
    }
}

impl AuthConfig {
    pub fn activation_link(&self, token: &str) -> String {
        format!(
            "{}/api/hospitals/activate/{token}",
            self.public_base_url.trim_end_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activation_link_tolerates_trailing_slash() {
        let cfg = AuthConfig {
            public_base_url: "https://care.example/".into(),
            ..AuthConfig::default()
        };
        assert_eq!(
            cfg.activation_link("tok"),
            "https://care.example/api/hospitals/activate/tok"
        );
    }
}
