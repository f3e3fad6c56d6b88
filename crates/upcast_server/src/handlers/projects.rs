//! Project HTTP handlers.

use super::success;
use crate::{error::HttpError, models::project::*, AppError, AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use upcast_core::{Ledger, ToggleOps};

/// Optional viewer for membership flags on a single project.
#[derive(Debug, Deserialize, Default)]
pub struct ViewerQuery {
    pub user_id: Option<String>,
}

/// Project plus the viewer's upvote/save state, when a viewer was given.
#[derive(Debug, Serialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_upvoted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_saved: Option<bool>,
}

/// Create a project owned by `creator_id`.
///
/// # Errors
/// Returns `400` for invalid fields and `404` when the owner or category is
/// missing.
pub async fn create_project(
    State(state): State<AppState>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), HttpError> {
    let project = state.db.projects.create(req)?;
    tracing::info!(project_id = %project.id, creator_id = %project.creator_id, "Created project");
    Ok((StatusCode::CREATED, Json(project)))
}

/// List projects with filters, sorting, and offset pagination.
pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ListProjectsQuery>,
) -> Result<Json<Vec<Project>>, HttpError> {
    Ok(Json(state.db.projects.list(&query)?))
}

/// Fetch one project; `?user_id=` adds `has_upvoted` and `has_saved`.
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(viewer): Query<ViewerQuery>,
) -> Result<Json<ProjectView>, HttpError> {
    let Some(project) = state.db.projects.get(&id)? else {
        return Err(AppError::not_found("project not found").into());
    };

    let viewer_id = viewer
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let (has_upvoted, has_saved) = match viewer_id {
        Some(user_id) => (
            Some(ToggleOps::is_member(
                &state.db,
                Ledger::ProjectUpvote,
                user_id,
                &id,
            )?),
            Some(ToggleOps::is_member(
                &state.db,
                Ledger::ProjectSave,
                user_id,
                &id,
            )?),
        ),
        None => (None, None),
    };

    Ok(Json(ProjectView {
        project,
        has_upvoted,
        has_saved,
    }))
}

/// Patch project metadata. Counters cannot be set through this endpoint.
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProjectRequest>,
) -> Result<Json<Project>, HttpError> {
    state
        .db
        .projects
        .update(&id, req)?
        .map(Json)
        .ok_or_else(|| AppError::not_found("project not found").into())
}

/// Delete a project with its comments and memberships.
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, HttpError> {
    if state.db.projects.delete(&id)? {
        Ok(Json(success()))
    } else {
        Err(AppError::not_found("project not found").into())
    }
}
