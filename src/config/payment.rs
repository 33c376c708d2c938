//! Payment configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentBackend {
    /// Every payment reports as paid.
    #[default]
    Mock,
    Stripe,
}

/// Payment configuration (Stripe)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    #[serde(default)]
    pub provider: PaymentBackend,

    /// Stripe secret key
    pub api_key: Option<SecretString>,

    /// Stripe webhook signing secret
    pub webhook_secret: Option<SecretString>,

    /// Overrides the Stripe API base URL (tests, proxies)
    pub api_base_url: Option<String>,

    #[serde(default = "default_currency")]
    pub currency: String,

    /// Reject webhooks from test mode
    #[serde(default)]
    pub require_livemode: bool,

    /// Where checkout returns the student after paying
    #[serde(default = "default_success_url")]
    pub success_url: String,

    /// Where checkout returns the student after abandoning
    #[serde(default = "default_cancel_url")]
    pub cancel_url: String,
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| k.expose_secret().starts_with("sk_test_"))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (label, url) in [("PAYMENT__SUCCESS_URL", &self.success_url), ("PAYMENT__CANCEL_URL", &self.cancel_url)] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(ValidationError::InvalidUrl(label));
            }
        }
        if self.provider == PaymentBackend::Mock {
            return Ok(());
        }

        let api_key = self
            .api_key
            .as_ref()
            .ok_or(ValidationError::MissingRequired("PAYMENT__API_KEY"))?;
        let webhook_secret = self
            .webhook_secret
            .as_ref()
            .ok_or(ValidationError::MissingRequired("PAYMENT__WEBHOOK_SECRET"))?;

        // Key prefixes catch publishable keys pasted in by mistake
        if !api_key.expose_secret().starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !webhook_secret.expose_secret().starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            provider: PaymentBackend::default(),
            api_key: None,
            webhook_secret: None,
            api_base_url: None,
            currency: default_currency(),
            require_livemode: false,
            success_url: default_success_url(),
            cancel_url: default_cancel_url(),
        }
    }
}

fn default_currency() -> String {
    "usd".to_string()
}

fn default_success_url() -> String {
    "http://localhost:5173/booking/success?checkout={CHECKOUT_SESSION_ID}".to_string()
}

fn default_cancel_url() -> String {
    "http://localhost:5173/booking".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stripe(api_key: &str, webhook_secret: &str) -> PaymentConfig {
        PaymentConfig {
            provider: PaymentBackend::Stripe,
            api_key: Some(SecretString::new(api_key.to_string())),
            webhook_secret: Some(SecretString::new(webhook_secret.to_string())),
            ..Default::default()
        }
    }

    #[test]
    fn mock_needs_no_keys() {
        assert!(PaymentConfig::default().validate().is_ok());
    }

    #[test]
    fn stripe_needs_both_secrets() {
        let config = PaymentConfig {
            provider: PaymentBackend::Stripe,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("PAYMENT__API_KEY"))
        );
    }

    #[test]
    fn key_prefixes_are_checked() {
        assert_eq!(
            stripe("pk_test_xxx", "whsec_xxx").validate(),
            Err(ValidationError::InvalidStripeKey)
        );
        assert_eq!(
            stripe("sk_test_xxx", "secret_xxx").validate(),
            Err(ValidationError::InvalidStripeWebhookSecret)
        );
        let valid = stripe("sk_test_abcd1234", "whsec_xyz789");
        assert!(valid.validate().is_ok());
        assert!(valid.is_test_mode());
    }

    #[test]
    fn return_urls_must_be_http() {
        let config = PaymentConfig {
            success_url: "tutorhub://done".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidUrl("PAYMENT__SUCCESS_URL"))
        );
    }
}
