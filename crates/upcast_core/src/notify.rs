//! Post-commit notification emission.
//!
//! Mutations that should notify someone return a [`PendingNotification`] only
//! after their transaction has committed, and hand it to a
//! [`PostCommitHook`]. The hook has no way to report failure back to the
//! mutation: a lost notification never turns a committed write into an error.

use crate::constants::FALLBACK_ACTOR_NAME;
use crate::models::comment::Comment;
use crate::models::creator::Creator;
use crate::models::notification::NotificationKind;
use crate::models::project::Project;
use crate::Database;
use serde_json::json;

/// Outbox entry for one notification that has not been recorded yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingNotification {
    pub recipient_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Opaque JSON. `path` is the in-app route the notification opens.
    pub payload: serde_json::Value,
}

impl PendingNotification {
    /// In-app route carried in the payload, if any.
    pub fn path(&self) -> Option<&str> {
        self.payload.get("path").and_then(serde_json::Value::as_str)
    }

    pub fn project_upvote(actor_id: &str, actor_name: &str, project: &Project) -> Self {
        Self {
            recipient_id: project.creator_id.clone(),
            kind: NotificationKind::ProjectUpvote,
            title: "New upvote".to_string(),
            message: format!("{} upvoted {}", actor_name, project.name),
            payload: json!({
                "project_id": project.id,
                "actor_id": actor_id,
                "path": format!("/projects/{}", project.id),
            }),
        }
    }

    pub fn creator_upvote(actor_id: &str, actor_name: &str, creator: &Creator) -> Self {
        Self {
            recipient_id: creator.user_id.clone(),
            kind: NotificationKind::CreatorUpvote,
            title: "New creator upvote".to_string(),
            message: format!("{} upvoted your creator profile", actor_name),
            payload: json!({
                "creator_id": creator.id,
                "actor_id": actor_id,
                "path": format!("/creators/{}", creator.id),
            }),
        }
    }

    pub fn comment(actor_name: &str, project: &Project, comment: &Comment) -> Self {
        Self {
            recipient_id: project.creator_id.clone(),
            kind: NotificationKind::Comment,
            title: "New comment".to_string(),
            message: format!("{} commented on {}", actor_name, project.name),
            payload: json!({
                "project_id": project.id,
                "comment_id": comment.id,
                "actor_id": comment.user_id,
                "path": format!("/projects/{}", project.id),
            }),
        }
    }
}

/// Receiver for notifications produced by committed mutations.
pub trait PostCommitHook {
    /// Take ownership of a notification whose triggering write has committed.
    fn after_commit(&self, pending: PendingNotification);
}

/// Hook that records notifications synchronously on the calling thread.
///
/// Append failures are logged and dropped.
pub struct InlineNotifier<'a> {
    db: &'a Database,
}

impl<'a> InlineNotifier<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }
}

impl PostCommitHook for InlineNotifier<'_> {
    fn after_commit(&self, pending: PendingNotification) {
        if let Err(err) = self.db.notifications.append(&pending) {
            tracing::warn!(
                recipient_id = %pending.recipient_id,
                kind = pending.kind.as_str(),
                "Failed to record notification: {}",
                err
            );
        }
    }
}

/// Resolve the display name used in notification text.
///
/// Lookup failures degrade to a generic name instead of failing the caller.
pub fn actor_display_name(db: &Database, actor_id: &str) -> String {
    match db.users.get(actor_id) {
        Ok(Some(user)) => user.label().to_string(),
        Ok(None) => FALLBACK_ACTOR_NAME.to_string(),
        Err(err) => {
            tracing::warn!(actor_id, "Actor lookup for notification failed: {}", err);
            FALLBACK_ACTOR_NAME.to_string()
        }
    }
}
