//! Booking wizard - plans, slots, and the gated draft handed to checkout.

mod draft;
mod errors;
mod plan;
mod slot;

pub use draft::{BookingContext, BookingDraft, BookingSelection, FinalizedBooking, WizardStep};
pub use errors::BookingError;
pub use plan::{required_sessions_count, Plan, PlanCatalog};
pub use slot::Slot;
