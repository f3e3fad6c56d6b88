//! User HTTP handlers.

use crate::{error::HttpError, models::project::Project, models::user::*, AppError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use upcast_core::{Ledger, ToggleOps};

/// Create or refresh a user from a Farcaster sign-in payload.
///
/// # Returns
/// `201 Created` for a new user, `200 OK` when an existing fid was refreshed.
///
/// # Errors
/// Returns an error if validation or persistence fails.
pub async fn upsert_user(
    State(state): State<AppState>,
    Json(req): Json<UpsertUserRequest>,
) -> Result<(StatusCode, Json<User>), HttpError> {
    let (user, created) = state.db.users.upsert_by_fid(&req)?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(user)))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, HttpError> {
    state
        .db
        .users
        .get(&id)?
        .map(Json)
        .ok_or_else(|| AppError::not_found("user not found").into())
}

pub async fn get_user_by_fid(
    State(state): State<AppState>,
    Path(fid): Path<u64>,
) -> Result<Json<User>, HttpError> {
    state
        .db
        .users
        .get_by_fid(fid)?
        .map(Json)
        .ok_or_else(|| AppError::not_found("user not found").into())
}

/// List the projects a user has saved, ordered by project id.
///
/// # Errors
/// Returns `404` when the user does not exist.
pub async fn list_saved_projects(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Project>>, HttpError> {
    if state.db.users.get(&id)?.is_none() {
        return Err(AppError::not_found("user not found").into());
    }
    let saved = ToggleOps::targets_for_actor(&state.db, Ledger::ProjectSave, &id)?;
    Ok(Json(state.db.projects.get_many(&saved)?))
}
