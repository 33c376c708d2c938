//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` port against the Stripe REST API using
//! form-encoded requests, plus webhook signature verification.
//!
//! # Security
//!
//! - HMAC-SHA256 signature verification with constant-time comparison
//! - Timestamp validation (5-minute window) for replay attack prevention
//! - Secrets handled via `secrecy::SecretString`

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use sha2::Sha256;
use std::collections::BTreeMap;
use subtle::ConstantTimeEq;

use crate::ports::{
    CheckoutRequest, CheckoutSession, PaymentError, PaymentErrorCode, PaymentIntent,
    PaymentProvider, PaymentStatus, PaymentWebhook, PaymentWebhookKind, Refund, RefundRequest,
};

use super::webhook_types::{
    hex_encode, SignatureHeader, StripeCheckoutSession, StripeErrorBody, StripePaymentIntent,
    StripeRefund, StripeWebhookEvent,
};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age for webhook events (5 minutes).
const MAX_TIMESTAMP_AGE_SECS: i64 = 300;

/// Clock skew tolerance for future timestamps (60 seconds).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 60;

/// Stripe rejects metadata values longer than this.
const MAX_METADATA_VALUE_CHARS: usize = 500;

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Webhook signing secret (whsec_...).
    webhook_secret: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// ISO currency code for checkout line items.
    currency: String,

    /// Whether to require livemode events in production.
    require_livemode: bool,
}

impl StripeConfig {
    pub fn new(api_key: SecretString, webhook_secret: SecretString) -> Self {
        Self {
            api_key,
            webhook_secret,
            api_base_url: "https://api.stripe.com".to_string(),
            currency: "usd".to_string(),
            require_livemode: false,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into().to_lowercase();
        self
    }

    /// Require livemode events in production.
    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }
}

/// Computes the `Stripe-Signature` value Stripe would send for `payload`.
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Some(format!(
        "t={},v1={}",
        timestamp,
        hex_encode(&mac.finalize().into_bytes())
    ))
}

/// Stripe payment provider adapter.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    fn metadata_params(
        metadata: &BTreeMap<String, String>,
    ) -> Result<Vec<(String, String)>, PaymentError> {
        metadata
            .iter()
            .map(|(key, value)| {
                if value.chars().count() > MAX_METADATA_VALUE_CHARS {
                    return Err(PaymentError::new(
                        PaymentErrorCode::ProviderError,
                        format!(
                            "metadata '{}' exceeds {} characters",
                            key, MAX_METADATA_VALUE_CHARS
                        ),
                    ));
                }
                Ok((format!("metadata[{}]", key), value.clone()))
            })
            .collect()
    }

    /// Verify webhook signature using HMAC-SHA256 against `now` (Unix seconds).
    fn verify_signature(
        &self,
        payload: &[u8],
        header: &SignatureHeader,
        now: i64,
    ) -> Result<(), PaymentError> {
        let age = now - header.timestamp;

        if age > MAX_TIMESTAMP_AGE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                age_secs = age,
                "Webhook event too old - possible replay attack"
            );
            return Err(PaymentError::invalid_webhook(format!(
                "Event too old ({} seconds)",
                age
            )));
        }

        if age < -MAX_FUTURE_TOLERANCE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                "Webhook event from future - clock skew or manipulation"
            );
            return Err(PaymentError::invalid_webhook("Event timestamp in future"));
        }

        let mut mac =
            HmacSha256::new_from_slice(self.config.webhook_secret.expose_secret().as_bytes())
                .map_err(|e| PaymentError::invalid_webhook(format!("Unusable secret: {}", e)))?;
        mac.update(header.timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        let expected = mac.finalize().into_bytes();
        let expected_bytes: &[u8] = expected.as_slice();

        let matched = header
            .v1_signatures
            .iter()
            .any(|provided| expected_bytes.ct_eq(provided.as_slice()).unwrap_u8() == 1);

        if !matched {
            tracing::warn!("Invalid webhook signature");
            return Err(PaymentError::invalid_webhook("Invalid signature"));
        }

        Ok(())
    }

    /// Parse a verified Stripe event into the port's webhook type.
    fn parse_event(&self, payload: &[u8]) -> Result<PaymentWebhook, PaymentError> {
        let event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse webhook payload");
            PaymentError::invalid_webhook(format!("Invalid JSON: {}", e))
        })?;

        if self.config.require_livemode && !event.livemode {
            tracing::warn!(event_id = %event.id, "Rejected test mode event in production");
            return Err(PaymentError::invalid_webhook(
                "Test mode events not allowed in production",
            ));
        }

        let kind = match event.event_type.as_str() {
            "checkout.session.completed" => {
                let session: StripeCheckoutSession =
                    serde_json::from_value(event.data.object.clone()).map_err(|e| {
                        PaymentError::invalid_webhook(format!("Invalid checkout session: {}", e))
                    })?;
                PaymentWebhookKind::CheckoutCompleted {
                    checkout_session_id: session.id,
                    session_reference: session.client_reference_id,
                    amount_total_cents: session.amount_total,
                    metadata: session.metadata,
                }
            }
            other => PaymentWebhookKind::Other {
                event_type: other.to_string(),
            },
        };

        Ok(PaymentWebhook {
            id: event.id,
            kind,
            created_at: event.created,
        })
    }

    /// Sends a request and decodes a 2xx body, mapping Stripe errors.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        operation: &'static str,
    ) -> Result<T, PaymentError> {
        let response = request
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<StripeErrorBody>(&body).ok().map(|b| b.error);
            let message = detail
                .as_ref()
                .and_then(|d| d.message.clone())
                .unwrap_or_else(|| body.clone());
            tracing::error!(operation, status = status.as_u16(), error = %message, "Stripe request failed");

            let code = match status.as_u16() {
                401 => PaymentErrorCode::AuthenticationError,
                402 => PaymentErrorCode::CardDeclined,
                404 => PaymentErrorCode::NotFound,
                429 => PaymentErrorCode::RateLimitExceeded,
                _ => PaymentErrorCode::ProviderError,
            };
            let mut err = PaymentError::new(code, format!("Stripe API error: {}", message));
            if let Some(provider_code) = detail.and_then(|d| d.code.or(d.error_type)) {
                err = err.with_provider_code(provider_code);
            }
            return Err(err);
        }

        response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Stripe response: {}", e))
        })
    }

    async fn get_checkout_session(&self, id: &str) -> Result<StripeCheckoutSession, PaymentError> {
        let url = self.url(&format!("/v1/checkout/sessions/{}", id));
        self.send(self.http_client.get(&url), "retrieve_checkout_session")
            .await
    }
}

/// Idempotency key and form body for a refund.
///
/// The key follows the refund reference, so two sessions paid by one
/// checkout get two refunds while a retried request replays.
fn refund_form(
    payment_intent: &str,
    request: &RefundRequest,
) -> (String, Vec<(&'static str, String)>) {
    (
        format!("refund-{}", request.refund_reference),
        vec![
            ("payment_intent", payment_intent.to_string()),
            ("amount", request.amount_cents.to_string()),
            ("metadata[session_id]", request.refund_reference.clone()),
        ],
    )
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let mut params: Vec<(String, String)> = vec![
            ("mode".into(), "payment".into()),
            ("success_url".into(), request.success_url.clone()),
            ("cancel_url".into(), request.cancel_url.clone()),
            ("client_reference_id".into(), request.session_reference.clone()),
            ("line_items[0][quantity]".into(), "1".into()),
            (
                "line_items[0][price_data][currency]".into(),
                self.config.currency.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]".into(),
                request.amount_cents.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".into(),
                request.description.clone(),
            ),
        ];
        if let Some(email) = &request.customer_email {
            params.push(("customer_email".into(), email.clone()));
        }
        params.extend(Self::metadata_params(&request.metadata)?);

        let builder = self
            .http_client
            .post(self.url("/v1/checkout/sessions"))
            .header("Idempotency-Key", format!("checkout-{}", request.session_reference))
            .form(&params);
        let session: StripeCheckoutSession = self.send(builder, "create_checkout_session").await?;

        tracing::info!(
            checkout_session_id = %session.id,
            amount_cents = request.amount_cents,
            "Stripe checkout session created"
        );

        Ok(CheckoutSession {
            url: session.url.unwrap_or_default(),
            id: session.id,
            expires_at: session.expires_at,
        })
    }

    async fn create_payment_intent(
        &self,
        amount_cents: i64,
        metadata: BTreeMap<String, String>,
    ) -> Result<PaymentIntent, PaymentError> {
        let mut params: Vec<(String, String)> = vec![
            ("amount".into(), amount_cents.to_string()),
            ("currency".into(), self.config.currency.clone()),
            ("automatic_payment_methods[enabled]".into(), "true".into()),
        ];
        params.extend(Self::metadata_params(&metadata)?);

        let builder = self
            .http_client
            .post(self.url("/v1/payment_intents"))
            .form(&params);
        let intent: StripePaymentIntent = self.send(builder, "create_payment_intent").await?;

        Ok(PaymentIntent {
            id: intent.id,
            client_secret: intent.client_secret,
        })
    }

    async fn retrieve_payment_status(&self, id: &str) -> Result<PaymentStatus, PaymentError> {
        let paid = if id.starts_with("pi_") {
            let url = self.url(&format!("/v1/payment_intents/{}", id));
            let intent: StripePaymentIntent =
                self.send(self.http_client.get(&url), "retrieve_payment_intent").await?;
            intent.status == "succeeded"
        } else {
            let session = self.get_checkout_session(id).await?;
            session.payment_status == "paid"
        };

        Ok(if paid {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Unpaid
        })
    }

    async fn create_refund(&self, request: RefundRequest) -> Result<Refund, PaymentError> {
        // Refunds are issued against the payment intent behind a checkout.
        let payment_intent = if request.payment_reference.starts_with("pi_") {
            request.payment_reference.clone()
        } else {
            self.get_checkout_session(&request.payment_reference)
                .await?
                .payment_intent
                .ok_or_else(|| PaymentError::not_found("payment intent for checkout session"))?
        };

        let (idempotency_key, params) = refund_form(&payment_intent, &request);
        let builder = self
            .http_client
            .post(self.url("/v1/refunds"))
            .header("Idempotency-Key", idempotency_key)
            .form(&params);
        let refund: StripeRefund = self.send(builder, "create_refund").await?;

        tracing::info!(
            refund_id = %refund.id,
            refund_reference = %request.refund_reference,
            amount_cents = refund.amount,
            "Stripe refund created"
        );

        Ok(Refund {
            id: refund.id,
            amount_cents: refund.amount,
        })
    }

    fn verify_webhook(&self, payload: &[u8], signature: &str) -> Result<PaymentWebhook, PaymentError> {
        let header = SignatureHeader::parse(signature).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse Stripe-Signature header");
            PaymentError::invalid_webhook(e.to_string())
        })?;

        self.verify_signature(payload, &header, chrono::Utc::now().timestamp())?;

        let webhook = self.parse_event(payload)?;
        tracing::info!(event_id = %webhook.id, "Webhook signature verified");
        Ok(webhook)
    }
}
