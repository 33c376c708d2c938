//! Mock payment provider for testing.
//!
//! Provides a configurable mock implementation of `PaymentProvider` for unit
//! and integration tests. Supports:
//! - Per-id payment status
//! - Error injection
//! - Call tracking
//! - Webhook event simulation

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::ports::{
    CheckoutRequest, CheckoutSession, PaymentError, PaymentIntent, PaymentProvider, PaymentStatus,
    PaymentWebhook, Refund, RefundRequest,
};

/// Mock payment provider for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentProvider::new();
///
/// // Unknown ids report as paid; override per id
/// mock.set_status("cs_mock_1", PaymentStatus::Unpaid);
///
/// // Inject errors
/// mock.set_method_error("create_refund", PaymentError::network("down"));
/// ```
#[derive(Default, Clone)]
pub struct MockPaymentProvider {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Status overrides by checkout/intent id.
    statuses: HashMap<String, PaymentStatus>,

    /// Status for ids without an override.
    default_status: Option<PaymentStatus>,

    /// Checkout requests by the id handed back.
    checkouts: HashMap<String, CheckoutRequest>,

    refunds: Vec<(String, i64)>,

    /// Issued refunds by refund reference; repeats replay the first.
    refunds_by_reference: HashMap<String, Refund>,

    next_id: u64,

    /// Error to return on next call.
    next_error: Option<PaymentError>,

    /// Specific errors by method name.
    method_errors: HashMap<String, PaymentError>,

    call_log: Vec<MethodCall>,

    webhook_verify_mode: WebhookVerifyMode,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

/// How to handle webhook verification.
#[derive(Default, Clone, Copy)]
enum WebhookVerifyMode {
    /// Accept any payload that parses as a `PaymentWebhook`.
    #[default]
    AcceptAll,

    AlwaysFail,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that fails all webhook verifications.
    pub fn rejecting_webhooks() -> Self {
        let mock = Self::new();
        mock.state().webhook_verify_mode = WebhookVerifyMode::AlwaysFail;
        mock
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    pub fn set_status(&self, id: &str, status: PaymentStatus) {
        self.state().statuses.insert(id.to_string(), status);
    }

    /// Status reported for ids without an explicit override (default: paid).
    pub fn set_default_status(&self, status: PaymentStatus) {
        self.state().default_status = Some(status);
    }

    /// Set an error to return on the next call to any method.
    pub fn set_error(&self, error: PaymentError) {
        self.state().next_error = Some(error);
    }

    /// Set an error for a specific method.
    pub fn set_method_error(&self, method: &str, error: PaymentError) {
        self.state().method_errors.insert(method.to_string(), error);
    }

    pub fn clear_errors(&self) {
        let mut state = self.state();
        state.next_error = None;
        state.method_errors.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<MethodCall> {
        self.state().call_log.clone()
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.state().call_log.iter().any(|c| c.method == method)
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.state()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// The checkout request that produced `checkout_id`.
    pub fn checkout_request(&self, checkout_id: &str) -> Option<CheckoutRequest> {
        self.state().checkouts.get(checkout_id).cloned()
    }

    /// Refunds issued so far as `(payment_reference, amount_cents)`.
    pub fn refunds(&self) -> Vec<(String, i64)> {
        self.state().refunds.clone()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Internal Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.state().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self, method: &str) -> Result<(), PaymentError> {
        let mut state = self.state();

        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }

        // Global error is consumed
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        Ok(())
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut state = self.state();
        state.next_id += 1;
        format!("{}_mock_{}", prefix, state.next_id)
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        self.record_call(
            "create_checkout_session",
            vec![
                request.session_reference.clone(),
                request.amount_cents.to_string(),
            ],
        );
        self.check_error("create_checkout_session")?;

        let id = self.next_id("cs");
        self.state().checkouts.insert(id.clone(), request);

        Ok(CheckoutSession {
            url: format!("https://checkout.stripe.com/c/pay/{}", id),
            id,
            expires_at: chrono::Utc::now().timestamp() + 24 * 60 * 60,
        })
    }

    async fn create_payment_intent(
        &self,
        amount_cents: i64,
        _metadata: BTreeMap<String, String>,
    ) -> Result<PaymentIntent, PaymentError> {
        self.record_call("create_payment_intent", vec![amount_cents.to_string()]);
        self.check_error("create_payment_intent")?;

        let id = self.next_id("pi");
        Ok(PaymentIntent {
            client_secret: Some(format!("{}_secret", id)),
            id,
        })
    }

    async fn retrieve_payment_status(&self, id: &str) -> Result<PaymentStatus, PaymentError> {
        self.record_call("retrieve_payment_status", vec![id.to_string()]);
        self.check_error("retrieve_payment_status")?;

        let state = self.state();
        Ok(state
            .statuses
            .get(id)
            .copied()
            .or(state.default_status)
            .unwrap_or(PaymentStatus::Paid))
    }

    async fn create_refund(&self, request: RefundRequest) -> Result<Refund, PaymentError> {
        self.record_call(
            "create_refund",
            vec![
                request.payment_reference.clone(),
                request.amount_cents.to_string(),
                request.refund_reference.clone(),
            ],
        );
        self.check_error("create_refund")?;

        let existing = self
            .state()
            .refunds_by_reference
            .get(&request.refund_reference)
            .cloned();
        if let Some(existing) = existing {
            return Ok(existing);
        }
        let refund = Refund {
            id: self.next_id("re"),
            amount_cents: request.amount_cents,
        };
        let mut state = self.state();
        state
            .refunds
            .push((request.payment_reference, request.amount_cents));
        state
            .refunds_by_reference
            .insert(request.refund_reference, refund.clone());
        Ok(refund)
    }

    fn verify_webhook(&self, payload: &[u8], signature: &str) -> Result<PaymentWebhook, PaymentError> {
        self.record_call("verify_webhook", vec![signature.to_string()]);
        self.check_error("verify_webhook")?;

        match self.state().webhook_verify_mode {
            WebhookVerifyMode::AlwaysFail => {
                Err(PaymentError::invalid_webhook("Mock: signature rejected"))
            }
            WebhookVerifyMode::AcceptAll => serde_json::from_slice(payload)
                .map_err(|e| PaymentError::invalid_webhook(format!("Mock: {}", e))),
        }
    }
}
