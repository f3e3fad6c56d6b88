//! Creator profile HTTP handlers.

use crate::{error::HttpError, models::creator::*, AppError, AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use upcast_core::db::project::normalized_limit;

#[derive(Debug, Deserialize, Default)]
pub struct ListCreatorsQuery {
    pub limit: Option<usize>,
}

pub async fn create_creator(
    State(state): State<AppState>,
    Json(req): Json<CreateCreatorRequest>,
) -> Result<(StatusCode, Json<Creator>), HttpError> {
    let creator = state.db.creators.create(req)?;
    Ok((StatusCode::CREATED, Json(creator)))
}

/// List creators, most upvoted first.
pub async fn list_creators(
    State(state): State<AppState>,
    Query(query): Query<ListCreatorsQuery>,
) -> Result<Json<Vec<Creator>>, HttpError> {
    let limit = normalized_limit(query.limit);
    Ok(Json(state.db.creators.list(limit)?))
}

pub async fn get_creator(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Creator>, HttpError> {
    state
        .db
        .creators
        .get(&id)?
        .map(Json)
        .ok_or_else(|| AppError::not_found("creator not found").into())
}
