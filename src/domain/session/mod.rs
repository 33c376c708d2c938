//! Session domain module.
//!
//! A session moves through `available → pending → scheduled` and then ends
//! as `completed`, `cancelled` or `no-show`, the last two optionally
//! followed by `refunded`. See `status` for the full transition table.

mod aggregate;
mod errors;
mod events;
mod record;
mod status;

pub use aggregate::{
    Cancellation, CheckoutBooking, MeetingLink, NewSlot, NoShowMark, NoShowParty, Session,
};
pub use errors::SessionError;
pub use events::SessionEvent;
pub use record::SessionRecord;
pub use status::{SessionStatus, SessionType};

#[cfg(test)]
pub(crate) use aggregate::tests as fixtures;
