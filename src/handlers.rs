use crate::display::{compute_display_snapshot, history_views};
use crate::errors::AppError;
use crate::models::{
    ClearRequest, Confirmation, GoalRequest, Notification, ScoreRequest, TrackerResponse,
    TrackerState,
};
use crate::state::AppState;
use crate::storage::persist_state;
use crate::ui::render_index;
use axum::{
    extract::State,
    response::{Html, Redirect},
    Form, Json,
};
use chrono::Utc;
use std::num::NonZeroI64;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let tracker = state.tracker.lock().await;
    Html(render_index(&to_response(&tracker, None)))
}

pub async fn get_state(State(state): State<AppState>) -> Json<TrackerResponse> {
    let tracker = state.tracker.lock().await;
    Json(to_response(&tracker, None))
}

pub async fn set_goal(
    State(state): State<AppState>,
    Json(payload): Json<GoalRequest>,
) -> Result<Json<TrackerResponse>, AppError> {
    Ok(Json(apply_goal(&state, &payload.goal).await?))
}

pub async fn score(
    State(state): State<AppState>,
    Json(payload): Json<ScoreRequest>,
) -> Result<Json<TrackerResponse>, AppError> {
    let delta = delta_for(&state, payload.action.trim())?;
    Ok(Json(apply_score(&state, delta).await?))
}

pub async fn clear(
    State(state): State<AppState>,
    Json(payload): Json<ClearRequest>,
) -> Result<Json<TrackerResponse>, AppError> {
    Ok(Json(apply_clear(&state, payload.confirmed.into()).await?))
}

pub async fn goal_form(
    State(state): State<AppState>,
    Form(payload): Form<GoalRequest>,
) -> Result<Redirect, AppError> {
    apply_goal(&state, &payload.goal).await?;
    Ok(Redirect::to("/"))
}

pub async fn score_add(State(state): State<AppState>) -> Result<Redirect, AppError> {
    apply_score(&state, state.point_step).await?;
    Ok(Redirect::to("/"))
}

pub async fn score_sub(State(state): State<AppState>) -> Result<Redirect, AppError> {
    apply_score(&state, -state.point_step).await?;
    Ok(Redirect::to("/"))
}

pub async fn clear_form(
    State(state): State<AppState>,
    Form(payload): Form<ClearRequest>,
) -> Result<Redirect, AppError> {
    apply_clear(&state, payload.confirmed.into()).await?;
    Ok(Redirect::to("/"))
}

fn delta_for(state: &AppState, action: &str) -> Result<NonZeroI64, AppError> {
    match action {
        "add" => Ok(state.point_step),
        "sub" => Ok(-state.point_step),
        _ => Err(AppError::bad_request("action must be 'add' or 'sub'")),
    }
}

async fn apply_goal(state: &AppState, raw: &str) -> Result<TrackerResponse, AppError> {
    let mut tracker = state.tracker.lock().await;
    let notification = tracker.set_goal(raw)?;
    persist_state(&state.data_path, &tracker).await?;

    Ok(to_response(&tracker, Some(notification)))
}

async fn apply_score(state: &AppState, delta: NonZeroI64) -> Result<TrackerResponse, AppError> {
    let mut tracker = state.tracker.lock().await;
    let notification = tracker.add_score(delta, Utc::now());
    persist_state(&state.data_path, &tracker).await?;

    Ok(to_response(&tracker, Some(notification)))
}

async fn apply_clear(
    state: &AppState,
    confirmation: Confirmation,
) -> Result<TrackerResponse, AppError> {
    let mut tracker = state.tracker.lock().await;
    let notification = tracker.clear_all(confirmation);
    if notification.is_some() {
        persist_state(&state.data_path, &tracker).await?;
    }

    Ok(to_response(&tracker, notification))
}

fn to_response(tracker: &TrackerState, notification: Option<Notification>) -> TrackerResponse {
    let snapshot = compute_display_snapshot(tracker);
    TrackerResponse {
        history: history_views(&snapshot.history),
        current_score: snapshot.current_score,
        goal: snapshot.goal,
        remaining: snapshot.remaining,
        wins: snapshot.wins,
        losses: snapshot.losses,
        progress_percent: snapshot.progress_percent,
        progress_tier: snapshot.progress_tier,
        notification,
    }
}
