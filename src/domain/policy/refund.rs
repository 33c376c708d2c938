//! Cancellation refund policy.
//!
//! Cancelling at least 24 hours before the session starts refunds the full
//! amount charged. Anything later is charged in full.

use chrono::Duration;
use serde::Serialize;

use crate::domain::foundation::Timestamp;
use crate::domain::session::Session;

/// Hours of notice needed for a full refund. Exactly this much is enough.
pub const REFUND_CUTOFF_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundQuote {
    pub refund_amount_cents: i64,
    pub is_full_charge: bool,
    /// Notice given, in hours; never negative.
    pub hours_before_session: f64,
}

pub fn calculate_refund(session: &Session, cancelled_at: Timestamp) -> RefundQuote {
    let notice = session.scheduled_start().duration_since(&cancelled_at);
    let is_full_charge = notice < Duration::hours(REFUND_CUTOFF_HOURS);
    let hours_before_session = (notice.num_milliseconds() as f64 / 3_600_000.0).max(0.0);

    RefundQuote {
        refund_amount_cents: if is_full_charge {
            0
        } else {
            session.amount_charged_cents()
        },
        is_full_charge,
        hours_before_session,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::{CheckoutBooking, SessionType};
    use crate::domain::foundation::{ProviderId, UserId};
    use proptest::prelude::*;

    fn start() -> Timestamp {
        Timestamp::parse("2025-06-10T15:00:00Z").unwrap()
    }

    fn paid_session(charged: i64) -> Session {
        let (session, _) = Session::from_checkout(
            CheckoutBooking {
                student_id: UserId::new("student-1").unwrap(),
                provider_id: ProviderId::new("tutor-math-1").unwrap(),
                session_type: SessionType::Tutoring,
                subject: None,
                start: start(),
                end: start().plus_minutes(60),
                price_cents: charged,
                amount_charged_cents: charged,
                payment_reference: "pi_1".into(),
            },
            start().minus_hours(240),
        )
        .unwrap();
        session
    }

    #[test]
    fn exactly_twenty_four_hours_is_refundable() {
        let quote = calculate_refund(&paid_session(7500), start().minus_hours(24));
        assert!(!quote.is_full_charge);
        assert_eq!(quote.refund_amount_cents, 7500);
        assert_eq!(quote.hours_before_session, 24.0);
    }

    #[test]
    fn one_minute_short_is_full_charge() {
        let cancelled_at = start().minus_hours(24).plus_minutes(1);
        let quote = calculate_refund(&paid_session(7500), cancelled_at);
        assert!(quote.is_full_charge);
        assert_eq!(quote.refund_amount_cents, 0);
    }

    #[test]
    fn cancelling_after_start_floors_hours_at_zero() {
        let quote = calculate_refund(&paid_session(7500), start().plus_hours(2));
        assert!(quote.is_full_charge);
        assert_eq!(quote.hours_before_session, 0.0);
    }

    proptest! {
        #[test]
        fn refund_is_all_or_nothing(offset_minutes in -3000i64..6000, charged in 0i64..100_000) {
            let session = paid_session(charged);
            let cancelled_at = start().plus_minutes(-offset_minutes);
            let quote = calculate_refund(&session, cancelled_at);

            prop_assert_eq!(quote.is_full_charge, offset_minutes < 24 * 60);
            if quote.is_full_charge {
                prop_assert_eq!(quote.refund_amount_cents, 0);
            } else {
                prop_assert_eq!(quote.refund_amount_cents, charged);
            }
            prop_assert!(quote.hours_before_session >= 0.0);
        }
    }
}
