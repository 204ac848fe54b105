//! HTTP-level integration tests for the roster endpoints.
//!
//! Requests go straight to the router through `tower::ServiceExt`.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post, post_json, put_json, seed_session, seed_template, upcoming};
use serde_json::json;
use sqlx::PgPool;

const SATURDAY: u32 = 6;

fn checkin_body(student_id: i64, name: &str) -> serde_json::Value {
    json!({ "student_id": student_id, "student_name": name })
}

// ---------------------------------------------------------------------------
// Roster listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_roster_lists_projected_classes_in_start_order(pool: PgPool) {
    let late = seed_template(&pool, SATURDAY as i16, 10, None).await;
    let early = seed_template(&pool, SATURDAY as i16, 8, Some(12)).await;
    let day = upcoming(SATURDAY);

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/rosters/{day}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["identity"], format!("regular:{early}:{day}"));
    assert_eq!(data[0]["capacity"], 12);
    assert_eq!(data[0]["status"], "open");
    assert_eq!(data[0]["materialized"], false);
    assert_eq!(data[1]["source_template_id"], late);
    assert!(data[1]["capacity"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_roster_includes_special_sessions(pool: PgPool) {
    let day = upcoming(SATURDAY);
    seed_template(&pool, SATURDAY as i16, 8, None).await;
    let session = seed_session(&pool, day, 7, Some(5)).await;

    let app = common::build_test_app(pool);
    let json = body_json(get(app, &format!("/api/v1/rosters/{day}")).await).await;
    let data = json["data"].as_array().unwrap();

    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["kind"], "special");
    assert_eq!(data[0]["session_id"], session);
    assert!(data[0]["source_template_id"].is_null());
    assert_eq!(data[0]["summary"]["available"], 5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_roster_rejects_malformed_date(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/rosters/not-a-date").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Instance reads
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_projected_instance(pool: PgPool) {
    let id = seed_template(&pool, SATURDAY as i16, 8, Some(3)).await;
    let identity = format!("regular:{id}:{}", upcoming(SATURDAY));

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/instances/{identity}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["identity"], identity);
    assert_eq!(json["data"]["summary"]["occupied"], 0);
    assert_eq!(json["data"]["summary"]["available"], 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_instance_on_non_matching_weekday_returns_404(pool: PgPool) {
    let id = seed_template(&pool, SATURDAY as i16, 8, None).await;
    let identity = format!("regular:{id}:{}", upcoming(1));

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/instances/{identity}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_malformed_identity_returns_400(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/instances/weekly:1:2025-07-05").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Pre-check-ins
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_pre_checkin_materializes_instance(pool: PgPool) {
    let id = seed_template(&pool, SATURDAY as i16, 8, Some(10)).await;
    let day = upcoming(SATURDAY);
    let identity = format!("regular:{id}:{day}");

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/instances/{identity}/pre-checkins"),
        checkin_body(1, "  Ana  "),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert!(json["data"]["checkin_id"].is_string());
    let instance = &json["data"]["instance"];
    assert_eq!(instance["materialized"], true);
    assert_eq!(instance["pre_checkins"][0]["student_name"], "Ana");
    assert_eq!(instance["summary"]["available"], 9);

    let app = common::build_test_app(pool);
    let json = body_json(get(app, &format!("/api/v1/rosters/{day}")).await).await;
    assert_eq!(json["data"][0]["summary"]["occupied"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_pre_checkin_returns_409(pool: PgPool) {
    let id = seed_template(&pool, SATURDAY as i16, 8, None).await;
    let uri = format!("/api/v1/instances/regular:{id}:{}/pre-checkins", upcoming(SATURDAY));

    let app = common::build_test_app(pool.clone());
    assert_eq!(
        post_json(app, &uri, checkin_body(7, "Caio")).await.status(),
        StatusCode::CREATED
    );

    let app = common::build_test_app(pool);
    let response = post_json(app, &uri, checkin_body(7, "Caio")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "DUPLICATE_CHECKIN");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_special_session_capacity_returns_409_when_full(pool: PgPool) {
    let day = upcoming(SATURDAY);
    let session = seed_session(&pool, day, 8, Some(5)).await;
    let uri = format!("/api/v1/instances/special:{session}:{day}/pre-checkins");

    for student in 1..=5 {
        let app = common::build_test_app(pool.clone());
        let response = post_json(app, &uri, checkin_body(student, "Aluno")).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let app = common::build_test_app(pool);
    let response = post_json(app, &uri, checkin_body(6, "Aluno")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CAPACITY_EXCEEDED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_pre_checkin_body_is_validated(pool: PgPool) {
    let id = seed_template(&pool, SATURDAY as i16, 8, None).await;
    let uri = format!("/api/v1/instances/regular:{id}:{}/pre-checkins", upcoming(SATURDAY));

    let app = common::build_test_app(pool.clone());
    let response = post_json(app, &uri, checkin_body(1, "")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool.clone());
    let response = post_json(app, &uri, checkin_body(0, "Ana")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool.clone());
    let response = post_json(app, &uri, checkin_body(1, "   ")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let app = common::build_test_app(pool);
    let json = body_json(get(app, &format!("/api/v1/rosters/{}", upcoming(SATURDAY))).await).await;
    assert_eq!(json["data"][0]["materialized"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mistyped_body_returns_json_400(pool: PgPool) {
    let id = seed_template(&pool, SATURDAY as i16, 8, None).await;
    let base = format!("/api/v1/instances/regular:{id}:{}", upcoming(SATURDAY));

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("{base}/pre-checkins"),
        json!({ "student_id": "x", "student_name": "Ana" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");

    let app = common::build_test_app(pool);
    let response = put_json(app, &format!("{base}/attendance/abc"), json!({ "present": true })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cancel_frees_the_seat(pool: PgPool) {
    let id = seed_template(&pool, SATURDAY as i16, 8, Some(1)).await;
    let identity = format!("regular:{id}:{}", upcoming(SATURDAY));
    let uri = format!("/api/v1/instances/{identity}/pre-checkins");

    let app = common::build_test_app(pool.clone());
    let created = body_json(post_json(app, &uri, checkin_body(1, "Ana")).await).await;
    let checkin_id = created["data"]["checkin_id"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("{uri}/{checkin_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["pre_checkins"].as_array().unwrap().len(), 0);
    assert_eq!(json["data"]["summary"]["cancelled"], 1);

    let app = common::build_test_app(pool);
    let response = post_json(app, &uri, checkin_body(2, "Bruno")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cancel_unknown_checkin_returns_404(pool: PgPool) {
    let id = seed_template(&pool, SATURDAY as i16, 8, None).await;
    let uri = format!(
        "/api/v1/instances/regular:{id}:{}/pre-checkins/{}",
        upcoming(SATURDAY),
        uuid::Uuid::new_v4()
    );

    let app = common::build_test_app(pool);
    assert_eq!(delete(app, &uri).await.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Attendance and status
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_attendance_is_overwritten_not_duplicated(pool: PgPool) {
    let id = seed_template(&pool, SATURDAY as i16, 8, None).await;
    let uri = format!("/api/v1/instances/regular:{id}:{}/attendance/4", upcoming(SATURDAY));

    let app = common::build_test_app(pool.clone());
    assert_eq!(
        put_json(app, &uri, json!({ "present": true })).await.status(),
        StatusCode::OK
    );

    let app = common::build_test_app(pool);
    let json = body_json(put_json(app, &uri, json!({ "present": false })).await).await;
    let records = json["data"]["confirmed_attendance"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["status"], "absent");
    assert_eq!(json["data"]["summary"]["absent"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_flow_and_closed_rejections(pool: PgPool) {
    let id = seed_template(&pool, SATURDAY as i16, 8, None).await;
    let base = format!("/api/v1/instances/regular:{id}:{}", upcoming(SATURDAY));

    let app = common::build_test_app(pool.clone());
    let json = body_json(post(app, &format!("{base}/confirm-presence")).await).await;
    assert_eq!(json["data"]["status"], "presence_confirmed");

    // Pre-check-ins are closed once the list is confirmed.
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, &format!("{base}/pre-checkins"), checkin_body(1, "Ana")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "STATUS_CONFLICT");

    let app = common::build_test_app(pool.clone());
    let json = body_json(post(app, &format!("{base}/close")).await).await;
    assert_eq!(json["data"]["status"], "closed");

    let app = common::build_test_app(pool.clone());
    let response = post(app, &format!("{base}/confirm-presence")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "INVALID_TRANSITION");

    let app = common::build_test_app(pool);
    let response = put_json(app, &format!("{base}/attendance/1"), json!({ "present": true })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Reset
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reset_reverts_to_projection(pool: PgPool) {
    let id = seed_template(&pool, SATURDAY as i16, 8, None).await;
    let base = format!("/api/v1/instances/regular:{id}:{}", upcoming(SATURDAY));

    let app = common::build_test_app(pool.clone());
    post_json(app, &format!("{base}/pre-checkins"), checkin_body(1, "Ana")).await;

    let app = common::build_test_app(pool.clone());
    assert_eq!(delete(app, &base).await.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, &base).await).await;
    assert_eq!(json["data"]["materialized"], false);
    assert_eq!(json["data"]["summary"]["occupied"], 0);

    let app = common::build_test_app(pool);
    assert_eq!(delete(app, &base).await.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_pre_checkins_never_exceed_capacity(pool: PgPool) {
    let id = seed_template(&pool, SATURDAY as i16, 8, Some(3)).await;
    let identity = format!("regular:{id}:{}", upcoming(SATURDAY));
    let uri = format!("/api/v1/instances/{identity}/pre-checkins");

    // One router shared by all requests, as in the running server.
    let app = common::build_test_app(pool.clone());
    let handles: Vec<_> = (1..=12)
        .map(|student| {
            let app = app.clone();
            let uri = uri.clone();
            tokio::spawn(async move {
                post_json(app, &uri, checkin_body(student, "Aluno")).await.status()
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::CREATED => created += 1,
            status => assert_eq!(status, StatusCode::CONFLICT),
        }
    }
    assert_eq!(created, 3);

    let json = body_json(get(app, &format!("/api/v1/instances/{identity}")).await).await;
    assert_eq!(json["data"]["summary"]["occupied"], 3);
    assert_eq!(json["data"]["pre_checkins"].as_array().unwrap().len(), 3);
}
