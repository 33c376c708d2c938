//! No-show pricing.
//!
//! A student who does not show is charged the session price. A provider who
//! does not show (alone or together with the student) refunds the student.

use serde::Serialize;

use crate::domain::session::{NoShowParty, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoShowCharge {
    pub student_charge_cents: i64,
    pub provider_charge_cents: i64,
    pub refund_amount_cents: i64,
}

pub fn calculate_no_show_charge(session: &Session, party: NoShowParty) -> NoShowCharge {
    match party {
        NoShowParty::Student => NoShowCharge {
            student_charge_cents: session.price_cents(),
            provider_charge_cents: 0,
            refund_amount_cents: 0,
        },
        NoShowParty::Provider | NoShowParty::Both => NoShowCharge {
            student_charge_cents: 0,
            provider_charge_cents: 0,
            refund_amount_cents: session.amount_charged_cents(),
        },
    }
}

/// Same as `calculate_no_show_charge`, for an unparsed party string.
/// Unrecognised parties yield an all-zero charge.
pub fn calculate_no_show_charge_raw(session: &Session, party: &str) -> NoShowCharge {
    party
        .parse::<NoShowParty>()
        .map(|party| calculate_no_show_charge(session, party))
        .unwrap_or_default()
}
