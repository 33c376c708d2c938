//! HS256 JWT session validator.
//!
//! Tokens are issued by the account service with a shared secret. Besides
//! the standard `sub`/`exp` claims they carry the marketplace `role`.
//!
//! # Security
//!
//! - Signature checked with the shared secret (HS256 only)
//! - `exp` required and enforced, with configurable leeway
//! - Issuer and audience checked when configured

use async_trait::async_trait;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, AuthenticatedUser, Role, UserId};
use crate::ports::SessionValidator;

#[derive(Clone)]
pub struct JwtConfig {
    secret: SecretString,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    /// Clock skew allowance in seconds.
    pub leeway_secs: u64,
}

impl JwtConfig {
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            issuer: None,
            audience: None,
            leeway_secs: 30,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }
}

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// User id.
    pub sub: String,

    /// Expiry (Unix epoch seconds).
    pub exp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,

    /// "student", "provider" or "admin" (aliases like "tutor" accepted).
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub name: Option<String>,
}

pub struct JwtSessionValidator {
    config: JwtConfig,
    decoding_key: DecodingKey,
}

impl JwtSessionValidator {
    pub fn new(config: JwtConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.secret.expose_secret().as_bytes());
        Self {
            config,
            decoding_key,
        }
    }

    /// Signs `claims` with the configured secret. Used by tests and dev tooling.
    pub fn issue(&self, claims: &JwtClaims) -> Result<String, AuthError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.config.secret.expose_secret().as_bytes()),
        )
        .map_err(|e| AuthError::service_unavailable(format!("token signing failed: {}", e)))
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.config.leeway_secs;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        // set_issuer/set_audience only check the claim when it is present.
        if let Some(issuer) = &self.config.issuer {
            validation.set_issuer(&[issuer]);
            validation.required_spec_claims.insert("iss".to_string());
        }
        match &self.config.audience {
            Some(audience) => {
                validation.set_audience(&[audience]);
                validation.required_spec_claims.insert("aud".to_string());
            }
            None => validation.validate_aud = false,
        }
        validation
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = decode::<JwtClaims>(token, &self.decoding_key, &self.validation())
            .map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => {
                        tracing::debug!("Token expired");
                        AuthError::TokenExpired
                    }
                    ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => {
                        tracing::warn!(error = %e, "Token issued for another service");
                        AuthError::InvalidToken
                    }
                    _ => {
                        tracing::warn!(error = %e, "Token validation failed");
                        AuthError::InvalidToken
                    }
                }
            })?
            .claims;

        let role = claims
            .role
            .as_deref()
            .ok_or(AuthError::MissingRole)?
            .parse::<Role>()
            .map_err(|_| {
                tracing::warn!(role = ?claims.role, "Unrecognised role claim");
                AuthError::MissingRole
            })?;

        let user_id = UserId::new(claims.sub.clone()).map_err(|_| {
            tracing::warn!(sub = %claims.sub, "Invalid user ID in token");
            AuthError::InvalidToken
        })?;

        Ok(AuthenticatedUser::new(
            user_id,
            claims.email.unwrap_or_default(),
            claims.name,
            role,
        ))
    }
}

impl std::fmt::Debug for JwtSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSessionValidator")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> JwtSessionValidator {
        JwtSessionValidator::new(JwtConfig::new(SecretString::new("dev-secret".into())))
    }

    fn claims(role: Option<&str>, exp_offset: i64) -> JwtClaims {
        JwtClaims {
            sub: "student-1".into(),
            exp: chrono::Utc::now().timestamp() + exp_offset,
            iss: None,
            aud: None,
            role: role.map(str::to_string),
            email: Some("s1@example.com".into()),
            name: Some("Sam".into()),
        }
    }

    #[tokio::test]
    async fn accepts_signed_token_with_role() {
        let v = validator();
        let token = v.issue(&claims(Some("student"), 3600)).unwrap();

        let user = v.validate(&token).await.unwrap();

        assert_eq!(user.id.as_str(), "student-1");
        assert_eq!(user.role, Role::Student);
        assert_eq!(user.email, "s1@example.com");
    }

    #[tokio::test]
    async fn role_aliases_are_accepted() {
        let v = validator();
        let token = v.issue(&claims(Some("tutor"), 3600)).unwrap();
        assert_eq!(v.validate(&token).await.unwrap().role, Role::Provider);
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let v = validator();
        let token = v.issue(&claims(Some("student"), -3600)).unwrap();
        assert_eq!(v.validate(&token).await.unwrap_err(), AuthError::TokenExpired);
    }

    #[tokio::test]
    async fn missing_or_unknown_role_is_rejected() {
        let v = validator();
        let no_role = v.issue(&claims(None, 3600)).unwrap();
        assert_eq!(v.validate(&no_role).await.unwrap_err(), AuthError::MissingRole);

        let odd_role = v.issue(&claims(Some("janitor"), 3600)).unwrap();
        assert_eq!(v.validate(&odd_role).await.unwrap_err(), AuthError::MissingRole);
    }

    #[tokio::test]
    async fn wrong_secret_is_invalid() {
        let other =
            JwtSessionValidator::new(JwtConfig::new(SecretString::new("other-secret".into())));
        let token = other.issue(&claims(Some("admin"), 3600)).unwrap();
        assert_eq!(
            validator().validate(&token).await.unwrap_err(),
            AuthError::InvalidToken
        );
        assert_eq!(
            validator().validate("not.a.jwt").await.unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[tokio::test]
    async fn issuer_is_enforced_when_configured() {
        let v = JwtSessionValidator::new(
            JwtConfig::new(SecretString::new("dev-secret".into())).with_issuer("tutorhub-accounts"),
        );
        let mut c = claims(Some("student"), 3600);
        let unissued = v.issue(&c).unwrap();
        assert!(v.validate(&unissued).await.is_err());

        c.iss = Some("tutorhub-accounts".into());
        let issued = v.issue(&c).unwrap();
        assert!(v.validate(&issued).await.is_ok());
    }

    #[tokio::test]
    async fn audience_is_required_when_configured() {
        let v = JwtSessionValidator::new(
            JwtConfig::new(SecretString::new("dev-secret".into())).with_audience("tutorhub-api"),
        );
        let mut c = claims(Some("student"), 3600);
        let no_audience = v.issue(&c).unwrap();
        assert!(matches!(v.validate(&no_audience).await, Err(AuthError::InvalidToken)));

        c.aud = Some("billing-api".into());
        let other = v.issue(&c).unwrap();
        assert!(v.validate(&other).await.is_err());

        c.aud = Some("tutorhub-api".into());
        let ours = v.issue(&c).unwrap();
        assert!(v.validate(&ours).await.is_ok());
    }
}
