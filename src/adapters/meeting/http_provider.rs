//! Zoom-style meeting API adapter.
//!
//! ```ignore
//! let config = HttpMeetingConfig::new(token).with_base_url("https://api.zoom.us/v2");
//! let provider = HttpMeetingProvider::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::session::MeetingLink;
use crate::ports::{MeetingError, MeetingProvider, MeetingRequest};

/// Scheduled meeting, in the API's type numbering.
const SCHEDULED_MEETING: u8 = 2;

#[derive(Clone)]
pub struct HttpMeetingConfig {
    api_token: SecretString,
    pub base_url: String,
    /// Host account used when the request names no host email.
    pub default_host: String,
    pub timeout: Duration,
}

impl HttpMeetingConfig {
    pub fn new(api_token: SecretString) -> Self {
        Self {
            api_token,
            base_url: "https://api.zoom.us/v2".to_string(),
            default_host: "me".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_default_host(mut self, host: impl Into<String>) -> Self {
        self.default_host = host.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub struct HttpMeetingProvider {
    config: HttpMeetingConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct CreateMeetingBody<'a> {
    topic: &'a str,
    #[serde(rename = "type")]
    meeting_type: u8,
    start_time: String,
    duration: u32,
    timezone: &'static str,
}

#[derive(Debug, Deserialize)]
struct CreateMeetingResponse {
    /// Numeric in Zoom, string in some compatible APIs.
    id: serde_json::Value,
    join_url: String,
}

impl HttpMeetingProvider {
    pub fn new(config: HttpMeetingConfig) -> Result<Self, MeetingError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MeetingError::Unavailable(format!("http client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn meetings_url(&self, host: &str) -> String {
        format!("{}/users/{}/meetings", self.config.base_url, host)
    }

    fn parse_response(body: &str) -> Result<MeetingLink, MeetingError> {
        let parsed: CreateMeetingResponse = serde_json::from_str(body)
            .map_err(|e| MeetingError::InvalidResponse(e.to_string()))?;

        let meeting_id = match parsed.id {
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::String(s) if !s.is_empty() => s,
            other => {
                return Err(MeetingError::InvalidResponse(format!(
                    "unexpected meeting id {}",
                    other
                )))
            }
        };
        if parsed.join_url.trim().is_empty() {
            return Err(MeetingError::InvalidResponse("empty join_url".into()));
        }

        Ok(MeetingLink {
            join_url: parsed.join_url,
            meeting_id,
        })
    }
}

#[async_trait]
impl MeetingProvider for HttpMeetingProvider {
    async fn create_meeting(&self, request: MeetingRequest) -> Result<MeetingLink, MeetingError> {
        let host = request
            .host_email
            .as_deref()
            .unwrap_or(&self.config.default_host);
        let body = CreateMeetingBody {
            topic: &request.topic,
            meeting_type: SCHEDULED_MEETING,
            start_time: request.start.to_rfc3339(),
            duration: request.duration_minutes,
            timezone: "UTC",
        };

        let response = self
            .client
            .post(self.meetings_url(host))
            .bearer_auth(self.config.api_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MeetingError::Unavailable(format!("timed out after {:?}", self.config.timeout))
                } else {
                    MeetingError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if status.is_server_error() || status.as_u16() == 429 {
            return Err(MeetingError::Unavailable(format!("status {}: {}", status, text)));
        }
        if !status.is_success() {
            return Err(MeetingError::Rejected(format!("status {}: {}", status, text)));
        }

        let link = Self::parse_response(&text)?;
        tracing::debug!(meeting_id = %link.meeting_id, "Meeting created");
        Ok(link)
    }
}
