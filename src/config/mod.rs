//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `TUTORHUB` prefix and
//! `__` between nesting levels. Every section has a default, so an empty
//! environment yields a runnable development setup (mock payment, mock
//! meetings, mock auth, seed directory).
//!
//! # Example
//!
//! ```no_run
//! use tutorhub::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod directory;
mod error;
mod meeting;
mod payment;
mod server;
mod storage;

pub use auth::{AuthBackend, AuthConfig};
pub use directory::DirectoryConfig;
pub use error::{ConfigError, ValidationError};
pub use meeting::{MeetingBackend, MeetingConfig};
pub use payment::{PaymentBackend, PaymentConfig};
pub use server::{Environment, ServerConfig};
pub use storage::{StorageBackend, StorageConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Bind address, logging, timeouts
    #[serde(default)]
    pub server: ServerConfig,

    /// Session record store
    #[serde(default)]
    pub storage: StorageConfig,

    /// Payment collaborator (Stripe)
    #[serde(default)]
    pub payment: PaymentConfig,

    /// Video meeting collaborator
    #[serde(default)]
    pub meeting: MeetingConfig,

    /// Bearer token validation
    #[serde(default)]
    pub auth: AuthConfig,

    /// Provider directory source
    #[serde(default)]
    pub directory: DirectoryConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` if present, then reads `TUTORHUB__*` variables:
    ///
    /// - `TUTORHUB__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `TUTORHUB__PAYMENT__API_KEY=sk_test_...` -> `payment.api_key`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TUTORHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Production additionally refuses mock collaborators.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.storage.validate()?;
        self.payment.validate()?;
        self.meeting.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.directory.validate()?;

        if self.is_production() {
            if self.payment.provider == PaymentBackend::Mock {
                return Err(ValidationError::MockInProduction("Payment"));
            }
            if self.storage.backend == StorageBackend::Memory {
                return Err(ValidationError::MockInProduction("Storage"));
            }
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 8] = [
        "TUTORHUB__SERVER__PORT",
        "TUTORHUB__SERVER__ENVIRONMENT",
        "TUTORHUB__SERVER__LOG_JSON",
        "TUTORHUB__STORAGE__BACKEND",
        "TUTORHUB__PAYMENT__PROVIDER",
        "TUTORHUB__PAYMENT__API_KEY",
        "TUTORHUB__PAYMENT__WEBHOOK_SECRET",
        "TUTORHUB__MEETING__MAX_ATTEMPTS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn load_with(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        for (key, value) in vars {
            env::set_var(key, value);
        }
        let result = AppConfig::load();
        clear_env();
        result
    }

    #[test]
    fn test_empty_environment_is_a_valid_development_setup() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[]).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.payment.provider, PaymentBackend::Mock);
        assert_eq!(config.meeting.max_attempts, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nested_values_are_read() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[
            ("TUTORHUB__SERVER__PORT", "3000"),
            ("TUTORHUB__SERVER__LOG_JSON", "true"),
            ("TUTORHUB__STORAGE__BACKEND", "memory"),
            ("TUTORHUB__PAYMENT__PROVIDER", "stripe"),
            ("TUTORHUB__PAYMENT__API_KEY", "sk_test_abc"),
            ("TUTORHUB__PAYMENT__WEBHOOK_SECRET", "whsec_abc"),
            ("TUTORHUB__MEETING__MAX_ATTEMPTS", "5"),
        ])
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert!(config.server.log_json);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.payment.provider, PaymentBackend::Stripe);
        assert_eq!(
            config.payment.api_key.as_ref().unwrap().expose_secret(),
            "sk_test_abc"
        );
        assert_eq!(config.meeting.max_attempts, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_refuses_mocks() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[("TUTORHUB__SERVER__ENVIRONMENT", "production")]).unwrap();

        assert!(config.is_production());
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MockInProduction(_))
        ));
    }

    #[test]
    fn test_unparseable_value_is_a_load_error() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let result = load_with(&[("TUTORHUB__SERVER__PORT", "eighty")]);

        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }
}
