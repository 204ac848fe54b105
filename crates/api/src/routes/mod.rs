pub mod health;
pub mod roster;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /rosters/{date}                                   roster for one date
/// /instances/{identity}                             get, reset
/// /instances/{identity}/pre-checkins                add
/// /instances/{identity}/pre-checkins/{checkin_id}   cancel
/// /instances/{identity}/attendance/{student_id}     confirm (PUT)
/// /instances/{identity}/confirm-presence            status (POST)
/// /instances/{identity}/close                       status (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/rosters", roster::roster_routes())
        .nest("/instances", roster::instance_routes())
}
