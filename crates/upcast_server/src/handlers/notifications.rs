//! Notification feed HTTP handlers.

use super::success;
use crate::{error::HttpError, models::notification::*, AppState};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use upcast_core::db::project::normalized_limit;

/// List a user's notifications, newest first.
pub async fn list_notifications(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<Json<Vec<Notification>>, HttpError> {
    let limit = normalized_limit(query.limit);
    let listed = state
        .db
        .notifications
        .list_for_recipient(&user_id, limit, query.unread_only)?;
    Ok(Json(listed))
}

pub async fn unread_count(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, HttpError> {
    let unread = state.db.notifications.unread_count(&user_id)?;
    Ok(Json(json!({ "unread": unread })))
}

/// Mark one notification read on behalf of its recipient.
///
/// # Errors
/// Returns `404` when the notification is missing or addressed to someone
/// else.
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MarkReadRequest>,
) -> Result<Json<Notification>, HttpError> {
    let notification = state.db.notifications.mark_read(&id, req.user_id.trim())?;
    Ok(Json(notification))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, HttpError> {
    let updated = state.db.notifications.mark_all_read(&user_id)?;
    let mut body = success();
    body["updated"] = json!(updated);
    Ok(Json(body))
}
