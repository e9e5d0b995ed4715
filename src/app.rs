use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/goal", post(handlers::goal_form))
        .route("/score/add", post(handlers::score_add))
        .route("/score/sub", post(handlers::score_sub))
        .route("/clear", post(handlers::clear_form))
        .route("/api/state", get(handlers::get_state))
        .route("/api/goal", post(handlers::set_goal))
        .route("/api/score", post(handlers::score))
        .route("/api/clear", post(handlers::clear))
        .with_state(state)
}
