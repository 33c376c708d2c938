//! Video meeting configuration

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MeetingBackend {
    #[default]
    Mock,
    /// Zoom-style REST API
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeetingConfig {
    #[serde(default)]
    pub provider: MeetingBackend,

    pub api_token: Option<SecretString>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Host used when the provider has no email on file
    #[serde(default = "default_host")]
    pub default_host: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Tries per session before the link is given up on
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

impl MeetingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=10).contains(&self.max_attempts) {
            return Err(ValidationError::InvalidMeetingAttempts);
        }
        if self.provider == MeetingBackend::Http {
            if self.api_token.is_none() {
                return Err(ValidationError::MissingRequired("MEETING__API_TOKEN"));
            }
            if !self.base_url.starts_with("https://") && !self.base_url.starts_with("http://") {
                return Err(ValidationError::InvalidUrl("MEETING__BASE_URL"));
            }
        }
        Ok(())
    }
}

impl Default for MeetingConfig {
    fn default() -> Self {
        Self {
            provider: MeetingBackend::default(),
            api_token: None,
            base_url: default_base_url(),
            default_host: default_host(),
            timeout_secs: default_timeout(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.zoom.us/v2".to_string()
}

fn default_host() -> String {
    "me".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    200
}
