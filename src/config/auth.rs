//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthBackend {
    /// Fixed development tokens
    #[default]
    Mock,
    Jwt,
}

/// Authentication configuration (HS256 JWT)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub provider: AuthBackend,

    /// Shared signing secret
    pub jwt_secret: Option<SecretString>,

    /// Expected `iss` claim
    pub issuer: Option<String>,

    /// Expected `aud` claim
    pub audience: Option<String>,

    /// Clock skew allowance
    #[serde(default = "default_leeway")]
    pub leeway_secs: u64,
}

impl AuthConfig {
    /// Production refuses mock tokens and short secrets.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let production = *environment == Environment::Production;
        match self.provider {
            AuthBackend::Mock if production => Err(ValidationError::MockInProduction("Auth")),
            AuthBackend::Mock => Ok(()),
            AuthBackend::Jwt => {
                let secret = self
                    .jwt_secret
                    .as_ref()
                    .ok_or(ValidationError::MissingRequired("AUTH__JWT_SECRET"))?;
                if production && secret.expose_secret().len() < 32 {
                    return Err(ValidationError::WeakJwtSecret);
                }
                Ok(())
            }
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            provider: AuthBackend::default(),
            jwt_secret: None,
            issuer: None,
            audience: None,
            leeway_secs: default_leeway(),
        }
    }
}

fn default_leeway() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(secret: &str) -> AuthConfig {
        AuthConfig {
            provider: AuthBackend::Jwt,
            jwt_secret: Some(SecretString::new(secret.to_string())),
            ..Default::default()
        }
    }

    #[test]
    fn mock_is_development_only() {
        let config = AuthConfig::default();
        assert!(config.validate(&Environment::Development).is_ok());
        assert_eq!(
            config.validate(&Environment::Production),
            Err(ValidationError::MockInProduction("Auth"))
        );
    }

    #[test]
    fn jwt_requires_secret() {
        let config = AuthConfig {
            provider: AuthBackend::Jwt,
            ..Default::default()
        };
        assert!(config.validate(&Environment::Development).is_err());
    }

    #[test]
    fn production_requires_long_secret() {
        assert!(jwt("short").validate(&Environment::Development).is_ok());
        assert_eq!(
            jwt("short").validate(&Environment::Production),
            Err(ValidationError::WeakJwtSecret)
        );
        assert!(jwt(&"x".repeat(32))
            .validate(&Environment::Production)
            .is_ok());
    }
}
