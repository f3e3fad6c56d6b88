//! Category HTTP handlers.

use super::success;
use crate::{error::HttpError, models::category::*, AppError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

pub async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), HttpError> {
    let category = state.db.categories.create(req)?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, HttpError> {
    Ok(Json(state.db.categories.list()?))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Category>, HttpError> {
    state
        .db
        .categories
        .get(&id)?
        .map(Json)
        .ok_or_else(|| AppError::not_found("category not found").into())
}

/// Delete a category.
///
/// # Errors
/// Returns `400` while projects still reference the category and `404` when
/// it does not exist.
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, HttpError> {
    if state.db.categories.delete(&id)? {
        Ok(Json(success()))
    } else {
        Err(AppError::not_found("category not found").into())
    }
}
