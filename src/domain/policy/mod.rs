//! Cancellation and no-show pricing, plus ownership predicates.

mod no_show;
mod ownership;
mod refund;

pub use no_show::{calculate_no_show_charge, calculate_no_show_charge_raw, NoShowCharge};
pub use ownership::*;
pub use refund::{calculate_refund, RefundQuote, REFUND_CUTOFF_HOURS};
