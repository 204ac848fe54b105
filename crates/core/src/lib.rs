//! Attendance-list engine for the daily class roster.
//!
//! Pure domain logic with zero internal deps: class templates are projected
//! into concrete, date-bound instances, reconciled with the instances that
//! were already mutated and persisted, and driven through a small
//! pre-check-in / attendance state machine. Storage is reached only through
//! the traits in [`store`].

pub mod checkin;
pub mod error;
pub mod identity;
pub mod instance;
pub mod merger;
pub mod projector;
pub mod roster;
pub mod store;
pub mod template;
pub mod types;
pub mod window;
