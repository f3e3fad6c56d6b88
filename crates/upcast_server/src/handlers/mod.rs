//! HTTP request handlers.

/// Category endpoints.
pub mod categories;
/// Project comment endpoints.
pub mod comments;
/// Creator profile endpoints.
pub mod creators;
pub mod health;
/// Notification feed endpoints.
pub mod notifications;
/// Project endpoints.
pub mod projects;
/// User endpoints.
pub mod users;
/// Upvote and save toggles.
pub mod votes;
/// Mini-app lifecycle webhook.
pub mod webhook;

use serde_json::{json, Value};

/// Body returned by deletes and bulk updates.
pub(crate) fn success() -> Value {
    json!({ "success": true })
}
