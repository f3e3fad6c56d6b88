//! Project comment HTTP handlers.

use super::success;
use crate::{error::HttpError, models::comment::*, AppError, AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use upcast_core::db::comment::post_comment;

#[derive(Debug, Deserialize)]
pub struct DeleteCommentQuery {
    #[serde(default)]
    pub user_id: String,
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<Comment>>, HttpError> {
    if state.db.projects.get(&project_id)?.is_none() {
        return Err(AppError::not_found("project not found").into());
    }
    Ok(Json(state.db.comments.list_for_project(&project_id)?))
}

/// Post a comment; the project owner is notified unless they wrote it.
pub async fn create_comment(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), HttpError> {
    let notifier = state.notifier();
    let comment = post_comment(&state.db, &project_id, req, &notifier)?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Delete a comment written by `?user_id=`.
///
/// # Errors
/// Returns `404` when the comment is missing or belongs to someone else.
pub async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteCommentQuery>,
) -> Result<Json<Value>, HttpError> {
    if query.user_id.trim().is_empty() {
        return Err(AppError::validation("user_id is required").into());
    }
    if state.db.comments.delete(&id, query.user_id.trim())? {
        Ok(Json(success()))
    } else {
        Err(AppError::not_found("comment not found").into())
    }
}
