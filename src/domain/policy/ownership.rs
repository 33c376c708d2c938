//! Who may do what to offerings and sessions.
//!
//! Pure predicates over (entity, actor). The hierarchy is admin, then the
//! owning student or provider, then nobody. Handlers pass the answer to
//! `authorize` before touching the entity.

use crate::domain::foundation::{Actor, ProviderId, Role};
use crate::domain::offering::{Availability, ServiceType};
use crate::domain::session::{Session, SessionStatus};

fn is_owning_provider(provider_id: &str, actor: &Actor) -> bool {
    actor.role == Role::Provider && provider_id.trim() == actor.user_id.as_str()
}

fn is_session_student(session: &Session, actor: &Actor) -> bool {
    actor.role == Role::Student && session.is_student(&actor.user_id)
}

fn is_session_provider(session: &Session, actor: &Actor) -> bool {
    is_owning_provider(session.provider_id(), actor)
}

fn is_party(session: &Session, actor: &Actor) -> bool {
    is_session_student(session, actor) || is_session_provider(session, actor)
}

// ── ServiceType ───────────────────────────────────────────────────

pub fn can_create_service_type(provider_id: &ProviderId, actor: &Actor) -> bool {
    actor.is_admin() || is_owning_provider(provider_id.as_str(), actor)
}

/// The offering catalog is public to signed-in users.
pub fn can_view_service_type(_service: &ServiceType, _actor: &Actor) -> bool {
    true
}

pub fn can_update_service_type(service: &ServiceType, actor: &Actor) -> bool {
    actor.is_admin() || is_owning_provider(service.provider_id.as_str(), actor)
}

pub fn can_delete_service_type(service: &ServiceType, actor: &Actor) -> bool {
    can_update_service_type(service, actor)
}

// ── Availability ──────────────────────────────────────────────────

pub fn can_create_availability(provider_id: &ProviderId, actor: &Actor) -> bool {
    actor.is_admin() || is_owning_provider(provider_id.as_str(), actor)
}

pub fn can_view_availability(_availability: &Availability, _actor: &Actor) -> bool {
    true
}

pub fn can_update_availability(availability: &Availability, actor: &Actor) -> bool {
    actor.is_admin() || is_owning_provider(availability.provider_id.as_str(), actor)
}

pub fn can_delete_availability(availability: &Availability, actor: &Actor) -> bool {
    can_update_availability(availability, actor)
}

// ── Session ───────────────────────────────────────────────────────

/// Publishing an open slot on behalf of `provider_id`.
pub fn can_create_session(provider_id: &ProviderId, actor: &Actor) -> bool {
    actor.is_admin() || is_owning_provider(provider_id.as_str(), actor)
}

/// Open slots are visible to any student; booked sessions only to their parties.
pub fn can_view_session(session: &Session, actor: &Actor) -> bool {
    actor.is_admin()
        || is_party(session, actor)
        || (session.status() == SessionStatus::Available && actor.role == Role::Student)
}

pub fn can_book_session(session: &Session, actor: &Actor) -> bool {
    actor.is_admin()
        || (actor.role == Role::Student && session.status() == SessionStatus::Available)
}

pub fn can_update_session(session: &Session, actor: &Actor) -> bool {
    actor.is_admin() || is_session_provider(session, actor)
}

pub fn can_delete_session(_session: &Session, actor: &Actor) -> bool {
    actor.is_admin()
}

pub fn can_cancel_session(session: &Session, actor: &Actor) -> bool {
    actor.is_admin() || is_party(session, actor)
}

pub fn can_mark_no_show(session: &Session, actor: &Actor) -> bool {
    actor.is_admin() || is_party(session, actor)
}

pub fn can_complete_session(session: &Session, actor: &Actor) -> bool {
    actor.is_admin() || is_session_provider(session, actor)
}

/// Refund amounts come from policy, so either party may trigger one.
pub fn can_refund_session(session: &Session, actor: &Actor) -> bool {
    actor.is_admin() || is_party(session, actor)
}
