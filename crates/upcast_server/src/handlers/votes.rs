//! Upvote and save toggles.
//!
//! Each endpoint flips the caller's membership and answers with the net
//! action. Notifications are dispatched after the write has committed.

use crate::{error::HttpError, AppError, AppState};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use upcast_core::{Ledger, ToggleAction, ToggleOps};

/// Body of every toggle request. A missing `user_id` is a validation error.
#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub success: bool,
    pub action: ToggleAction,
}

/// Malformed bodies (wrong `user_id` type, bad JSON) are validation errors,
/// not axum's plain-text 4xx.
fn toggle_body(
    payload: Result<Json<ToggleRequest>, JsonRejection>,
) -> Result<ToggleRequest, HttpError> {
    match payload {
        Ok(Json(req)) => Ok(req),
        Err(rejection) => Err(AppError::validation(format!(
            "invalid toggle body: {}",
            rejection.body_text()
        ))
        .into()),
    }
}

fn run_toggle(
    state: &AppState,
    ledger: Ledger,
    target_id: &str,
    payload: Result<Json<ToggleRequest>, JsonRejection>,
) -> Result<Json<ToggleResponse>, HttpError> {
    let req = toggle_body(payload)?;
    let notifier = state.notifier();
    let action = ToggleOps::toggle(&state.db, ledger, &req.user_id, target_id, &notifier)?;
    tracing::info!(
        ledger = ledger.name(),
        actor_id = %req.user_id.trim(),
        target_id,
        action = action.as_str(),
        "Toggle applied"
    );
    Ok(Json(ToggleResponse {
        success: true,
        action,
    }))
}

pub async fn toggle_project_upvote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ToggleRequest>, JsonRejection>,
) -> Result<Json<ToggleResponse>, HttpError> {
    run_toggle(&state, Ledger::ProjectUpvote, &id, payload)
}

pub async fn toggle_project_save(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ToggleRequest>, JsonRejection>,
) -> Result<Json<ToggleResponse>, HttpError> {
    run_toggle(&state, Ledger::ProjectSave, &id, payload)
}

pub async fn toggle_creator_upvote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ToggleRequest>, JsonRejection>,
) -> Result<Json<ToggleResponse>, HttpError> {
    run_toggle(&state, Ledger::CreatorUpvote, &id, payload)
}
