//! Handlers for the attendance roster: listing a day's classes, pre-check-ins,
//! attendance confirmation and status changes.
//!
//! Instances are addressed by their identity text (`regular:12:2025-07-05`).
//! Occurrences that were never written to are served straight from the
//! projection; the first successful mutation materializes them.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use presenca_core::checkin::{self, RosterSummary};
use presenca_core::error::CoreError;
use presenca_core::identity::{InstanceKey, InstanceKind};
use presenca_core::instance::{AttendanceRecord, ClassInstance, InstanceStatus, PreCheckin};
use presenca_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// View models
// ---------------------------------------------------------------------------

/// Client-facing view of a class instance.
///
/// Cancelled pre-check-ins are hidden; the summary still counts them.
#[derive(Debug, Serialize)]
pub struct InstanceView {
    pub identity: InstanceKey,
    pub kind: InstanceKind,
    pub source_template_id: Option<DbId>,
    pub session_id: Option<DbId>,
    pub date: NaiveDate,
    pub start_time: chrono::NaiveTime,
    pub end_time: chrono::NaiveTime,
    pub unit: String,
    pub level_id: Option<DbId>,
    pub capacity: Option<u32>,
    pub status: InstanceStatus,
    pub pre_checkins: Vec<PreCheckin>,
    pub confirmed_attendance: Vec<AttendanceRecord>,
    pub summary: RosterSummary,
    pub materialized: bool,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl From<ClassInstance> for InstanceView {
    fn from(instance: ClassInstance) -> Self {
        let summary = checkin::summarize(&instance);
        let pre_checkins = checkin::active_pre_checkins(&instance).cloned().collect();
        Self {
            identity: instance.identity,
            kind: instance.kind(),
            source_template_id: instance.source_template_id(),
            session_id: instance.session_id(),
            date: instance.date,
            start_time: instance.start_time,
            end_time: instance.end_time,
            level_id: instance.level_id,
            capacity: instance.capacity,
            status: instance.status,
            materialized: instance.is_materialized(),
            created_at: instance.created_at,
            updated_at: instance.updated_at,
            unit: instance.unit,
            pre_checkins,
            confirmed_attendance: instance.confirmed_attendance,
            summary,
        }
    }
}

/// Response body for `POST /instances/{identity}/pre-checkins`.
#[derive(Debug, Serialize)]
pub struct PreCheckinCreated {
    /// Id of the new pre-check-in, used to cancel it later.
    pub checkin_id: Uuid,
    pub instance: InstanceView,
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Request body for `POST /instances/{identity}/pre-checkins`.
#[derive(Debug, Deserialize, Validate)]
pub struct PreCheckinInput {
    #[validate(range(min = 1))]
    pub student_id: DbId,
    #[validate(length(min = 1, max = 200))]
    pub student_name: String,
}

/// Request body for `PUT /instances/{identity}/attendance/{student_id}`.
#[derive(Debug, Deserialize)]
pub struct AttendanceInput {
    pub present: bool,
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/rosters/{date}
///
/// All classes on `date`, ordered by start time. Dates inside the projection
/// window include unmaterialized occurrences; dates outside it only show
/// instances that were already written to.
pub async fn list_roster(
    State(state): State<AppState>,
    ApiPath(date): ApiPath<NaiveDate>,
) -> AppResult<impl IntoResponse> {
    let instances = state.roster.instances_for_date(today(), date).await?;
    let data: Vec<InstanceView> = instances.into_iter().map(InstanceView::from).collect();
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/instances/{identity}
pub async fn get_instance(
    State(state): State<AppState>,
    ApiPath(identity): ApiPath<InstanceKey>,
) -> AppResult<impl IntoResponse> {
    let instance = state.roster.instance(&identity).await?;
    Ok(Json(DataResponse {
        data: InstanceView::from(instance),
    }))
}

/// DELETE /api/v1/instances/{identity}
///
/// Drop the materialized record so the occurrence reverts to its projection.
pub async fn reset_instance(
    State(state): State<AppState>,
    ApiPath(identity): ApiPath<InstanceKey>,
) -> AppResult<StatusCode> {
    if state.roster.reset_instance(&identity).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::NotFound {
            entity: "ClassInstance",
            id: identity.to_string(),
        }
        .into())
    }
}

// ---------------------------------------------------------------------------
// Pre-check-ins
// ---------------------------------------------------------------------------

/// POST /api/v1/instances/{identity}/pre-checkins
pub async fn add_pre_checkin(
    State(state): State<AppState>,
    ApiPath(identity): ApiPath<InstanceKey>,
    ApiJson(input): ApiJson<PreCheckinInput>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let (instance, checkin_id) = state
        .roster
        .add_pre_checkin(&identity, input.student_id, &input.student_name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: PreCheckinCreated {
                checkin_id,
                instance: InstanceView::from(instance),
            },
        }),
    ))
}

/// DELETE /api/v1/instances/{identity}/pre-checkins/{checkin_id}
pub async fn cancel_pre_checkin(
    State(state): State<AppState>,
    ApiPath((identity, checkin_id)): ApiPath<(InstanceKey, Uuid)>,
) -> AppResult<impl IntoResponse> {
    let instance = state
        .roster
        .cancel_pre_checkin(&identity, checkin_id)
        .await?;
    Ok(Json(DataResponse {
        data: InstanceView::from(instance),
    }))
}

// ---------------------------------------------------------------------------
// Attendance and status
// ---------------------------------------------------------------------------

/// PUT /api/v1/instances/{identity}/attendance/{student_id}
///
/// Record or overwrite a student's attendance. Idempotent.
pub async fn confirm_attendance(
    State(state): State<AppState>,
    ApiPath((identity, student_id)): ApiPath<(InstanceKey, DbId)>,
    ApiJson(input): ApiJson<AttendanceInput>,
) -> AppResult<impl IntoResponse> {
    let instance = state
        .roster
        .confirm_attendance(&identity, student_id, input.present)
        .await?;
    Ok(Json(DataResponse {
        data: InstanceView::from(instance),
    }))
}

/// POST /api/v1/instances/{identity}/confirm-presence
pub async fn confirm_presence(
    State(state): State<AppState>,
    ApiPath(identity): ApiPath<InstanceKey>,
) -> AppResult<impl IntoResponse> {
    let instance = state.roster.confirm_presence(&identity).await?;
    Ok(Json(DataResponse {
        data: InstanceView::from(instance),
    }))
}

/// POST /api/v1/instances/{identity}/close
pub async fn close_instance(
    State(state): State<AppState>,
    ApiPath(identity): ApiPath<InstanceKey>,
) -> AppResult<impl IntoResponse> {
    let instance = state.roster.close(&identity).await?;
    Ok(Json(DataResponse {
        data: InstanceView::from(instance),
    }))
}
