//! Checkout handlers: wizard answers to payment, payment to sessions.

mod complete_checkout;
mod payment_webhook;
mod start_checkout;

pub use complete_checkout::{CompleteCheckoutCommand, CompleteCheckoutHandler, CompleteCheckoutResult};
pub use payment_webhook::{PaymentWebhookHandler, WebhookOutcome, SYSTEM_USER};
pub use start_checkout::{
    CheckoutUrls, StartCheckoutCommand, StartCheckoutHandler, StartCheckoutResult, METADATA_BOOKING,
    METADATA_STUDENT,
};
