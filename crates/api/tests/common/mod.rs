#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{NaiveDate, NaiveTime};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use presenca_api::app::build_app;
use presenca_api::config::ServerConfig;
use presenca_api::state::AppState;
use presenca_db::models::schedule_template::CreateScheduleTemplate;
use presenca_db::models::special_session::CreateSpecialSession;
use presenca_db::repositories::{ScheduleTemplateRepo, SpecialSessionRepo};

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout and the default 30-day roster window.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        roster_window_days: 30,
    }
}

/// Build the full application router over the given pool, with the same
/// middleware stack production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app(AppState::new(pool, test_config()))
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn time(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, 0, 0).unwrap()
}

/// A date a few days ahead of today that falls on `weekday` (0 = Sunday).
pub fn upcoming(weekday: u32) -> NaiveDate {
    use chrono::Datelike;
    let mut day = chrono::Local::now().date_naive() + chrono::Duration::days(1);
    while day.weekday().num_days_from_sunday() != weekday {
        day = day.succ_opt().unwrap();
    }
    day
}

/// Insert an active weekly template and return its id.
pub async fn seed_template(pool: &PgPool, weekday: i16, start: u32, capacity: Option<i32>) -> i64 {
    ScheduleTemplateRepo::create(
        pool,
        &CreateScheduleTemplate {
            weekday,
            start_time: time(start),
            end_time: time(start + 1),
            unit: "Centro".to_string(),
            level_id: None,
            capacity,
        },
    )
    .await
    .unwrap()
    .id
}

/// Insert an active special session and return its id.
pub async fn seed_session(pool: &PgPool, on: NaiveDate, start: u32, capacity: Option<i32>) -> i64 {
    SpecialSessionRepo::create(
        pool,
        &CreateSpecialSession {
            session_date: on,
            start_time: time(start),
            end_time: time(start + 1),
            unit: "Centro".to_string(),
            level_id: Some(2),
            capacity,
        },
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
