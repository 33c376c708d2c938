//! Session command and query handlers.

mod book_session;
mod cancel_session;
pub(crate) mod common;
mod complete_session;
mod confirm_payment;
mod create_available_slot;
mod get_session;
mod list_sessions;
mod mark_no_show;
mod meetings;
mod process_refund;
mod publish_availability;

pub use book_session::{BookSessionCommand, BookSessionHandler};
pub use cancel_session::{CancelSessionCommand, CancelSessionHandler, CancelSessionResult};
pub use complete_session::{CompleteSessionCommand, CompleteSessionHandler};
pub use confirm_payment::{ConfirmPaymentCommand, ConfirmPaymentHandler, ConfirmPaymentResult};
pub use create_available_slot::{CreateAvailableSlotCommand, CreateAvailableSlotHandler};
pub use get_session::{GetSessionHandler, GetSessionQuery};
pub use list_sessions::{ListSessionsHandler, ListSessionsQuery};
pub use mark_no_show::{MarkNoShowCommand, MarkNoShowHandler, MarkNoShowResult};
pub use meetings::{MeetingOutcome, MeetingScheduler};
pub use process_refund::{ProcessRefundCommand, ProcessRefundHandler, ProcessRefundResult};
pub use publish_availability::{PublishAvailabilityCommand, PublishAvailabilityHandler};
