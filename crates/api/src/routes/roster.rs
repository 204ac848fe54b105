//! Route definitions for the attendance roster.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::roster;
use crate::state::AppState;

/// Routes mounted under `/rosters`.
///
/// ```text
/// GET    /{date}    -> list_roster
/// ```
pub fn roster_routes() -> Router<AppState> {
    Router::new().route("/{date}", get(roster::list_roster))
}

/// Routes mounted under `/instances`.
///
/// ```text
/// GET    /{identity}                              -> get_instance
/// DELETE /{identity}                              -> reset_instance
/// POST   /{identity}/pre-checkins                 -> add_pre_checkin
/// DELETE /{identity}/pre-checkins/{checkin_id}    -> cancel_pre_checkin
/// PUT    /{identity}/attendance/{student_id}      -> confirm_attendance
/// POST   /{identity}/confirm-presence             -> confirm_presence
/// POST   /{identity}/close                        -> close_instance
/// ```
pub fn instance_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/{identity}",
            get(roster::get_instance).delete(roster::reset_instance),
        )
        .route("/{identity}/pre-checkins", post(roster::add_pre_checkin))
        .route(
            "/{identity}/pre-checkins/{checkin_id}",
            delete(roster::cancel_pre_checkin),
        )
        .route(
            "/{identity}/attendance/{student_id}",
            put(roster::confirm_attendance),
        )
        .route(
            "/{identity}/confirm-presence",
            post(roster::confirm_presence),
        )
        .route("/{identity}/close", post(roster::close_instance))
}
