use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::handlers::{ErrorResponse, SuccessResponse};
use crate::state::AppState;
use common::models::{AdjustSummary, ImportSummary, Timer};
use common::service::CreateTimer;

/// Request to create a timer by hand
#[derive(Debug, Deserialize)]
pub struct CreateTimerRequest {
    pub name: String,
    /// e.g. `"90"` (minutes) or `"1d 2h 30m"`
    pub duration: String,
    pub category: Option<String>,
    pub is_repeating: Option<bool>,
}

/// Request to shift several timers at once
#[derive(Debug, Deserialize)]
pub struct AdjustTimersRequest {
    pub ids: Vec<Uuid>,
    /// Signed; negative values bring timers forward
    pub minutes: i64,
}

/// Timer as returned to clients
#[derive(Debug, Serialize)]
pub struct TimerView {
    #[serde(flatten)]
    pub timer: Timer,
    pub remaining_seconds: i64,
}

impl From<Timer> for TimerView {
    fn from(timer: Timer) -> Self {
        let remaining_seconds = timer.remaining_seconds(Utc::now());
        Self {
            timer,
            remaining_seconds,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClearedTimers {
    pub cleared: Vec<Uuid>,
}

/// List timers not cleared by the user, soonest first
#[tracing::instrument(skip(state))]
pub async fn list_timers(
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse<Vec<TimerView>>>, ErrorResponse> {
    let timers = state.service.list_active().await?;
    Ok(Json(SuccessResponse::new(
        timers.into_iter().map(TimerView::from).collect(),
    )))
}

/// Create a timer from a name and duration string
#[tracing::instrument(skip(state, req), fields(timer_name = %req.name))]
pub async fn create_timer(
    State(state): State<AppState>,
    Json(req): Json<CreateTimerRequest>,
) -> Result<(StatusCode, Json<SuccessResponse<TimerView>>), ErrorResponse> {
    let request = CreateTimer {
        name: req.name,
        duration: req.duration,
        category: req.category,
        is_repeating: req.is_repeating.unwrap_or(false),
    };

    let timer = state.service.create_timer(request, Utc::now()).await?;
    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::new(TimerView::from(timer))),
    ))
}

#[tracing::instrument(skip(state))]
pub async fn get_timer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse<TimerView>>, ErrorResponse> {
    let timer = state.service.get(id).await?;
    Ok(Json(SuccessResponse::new(TimerView::from(timer))))
}

#[tracing::instrument(skip(state))]
pub async fn delete_timer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse<Uuid>>, ErrorResponse> {
    state.service.delete(id).await?;
    tracing::info!(timer_id = %id, "Timer deleted");
    Ok(Json(SuccessResponse::new(id)))
}

/// Hide a timer from the active list
#[tracing::instrument(skip(state))]
pub async fn clear_timer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse<TimerView>>, ErrorResponse> {
    let timer = state.service.clear(id).await?;
    Ok(Json(SuccessResponse::new(TimerView::from(timer))))
}

/// Clear every expired timer still in the active list
#[tracing::instrument(skip(state))]
pub async fn clear_finished(
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse<ClearedTimers>>, ErrorResponse> {
    let cleared = state.service.clear_finished(Utc::now()).await?;
    Ok(Json(SuccessResponse::new(ClearedTimers { cleared })))
}

#[tracing::instrument(skip(state, req), fields(minutes = req.minutes))]
pub async fn adjust_timers(
    State(state): State<AppState>,
    Json(req): Json<AdjustTimersRequest>,
) -> Result<Json<SuccessResponse<AdjustSummary>>, ErrorResponse> {
    let summary = state
        .service
        .adjust(&req.ids, req.minutes, Utc::now())
        .await?;
    Ok(Json(SuccessResponse::new(summary)))
}

/// Import timers from a raw screenshot body
#[tracing::instrument(skip(state, body), fields(body_bytes = body.len()))]
pub async fn import_timers(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SuccessResponse<ImportSummary>>, ErrorResponse> {
    let summary = state
        .service
        .import_screenshot(&body, Utc::now())
        .await?;
    tracing::info!(count = summary.count, "Screenshot imported");
    Ok(Json(SuccessResponse::new(summary)))
}
