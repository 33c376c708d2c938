//! TutorHub - Booking core for a tutoring and college-counseling marketplace
//!
//! This crate implements provider matching, the booking wizard, the session
//! lifecycle with its refund and no-show policies, and the checkout flow
//! that turns a paid booking into scheduled sessions.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
