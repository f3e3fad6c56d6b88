//! Farcaster mini-app lifecycle webhook.
//!
//! The body is the already-verified event. Signature verification happens in
//! front of this service.

use crate::{error::HttpError, models::webhook::WebhookEnvelope, AppState};
use axum::{extract::State, Json};
use serde_json::{json, Value};

/// Apply a mini-app event to the stored push details for its fid.
///
/// # Errors
/// Returns `400` for malformed bodies and unknown event names.
pub async fn handle_webhook(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, HttpError> {
    let envelope = WebhookEnvelope::parse(body)?;
    let changed = state.db.push_tokens.apply_event(&envelope)?;
    tracing::info!(
        fid = envelope.fid,
        event = envelope.event.name(),
        changed,
        "Processed mini-app webhook"
    );
    Ok(Json(json!({
        "success": true,
        "event": envelope.event.name(),
        "changed": changed,
    })))
}
