//! Post-commit notification dispatch for request handlers.
//!
//! Handlers hand finished notifications to [`SpawnedNotifier`], which records
//! them and attempts push delivery on a background task so the response never
//! waits on either step.

use crate::{Config, Database};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use upcast_core::models::notification::Notification;
use upcast_core::models::webhook::NotificationDetails;
use upcast_core::{PendingNotification, PostCommitHook};

/// Body accepted by Farcaster mini-app notification endpoints.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PushRequest {
    pub notification_id: String,
    pub title: String,
    pub body: String,
    pub target_url: String,
    pub tokens: Vec<String>,
}

impl PushRequest {
    /// Build the push body for a stored notification.
    ///
    /// The notification id doubles as the receiver's idempotency key.
    pub fn new(notification: &Notification, app_url: &str, token: &str) -> Self {
        let path = notification
            .payload
            .get("path")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("/");
        Self {
            notification_id: notification.id.clone(),
            title: notification.title.clone(),
            body: notification.message.clone(),
            target_url: format!("{}{}", app_url.trim_end_matches('/'), path),
            tokens: vec![token.to_string()],
        }
    }
}

/// Build the outbound HTTP client used for push delivery.
pub fn push_client(config: &Config) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(config.push_timeout_ms))
        .build()
        .unwrap_or_else(|err| {
            tracing::warn!("Failed to build push client ({}); using defaults", err);
            reqwest::Client::new()
        })
}

/// Hook that records notifications and pushes them off the request path.
#[derive(Clone)]
pub struct SpawnedNotifier {
    db: Arc<Database>,
    config: Arc<Config>,
    http: reqwest::Client,
}

impl SpawnedNotifier {
    pub fn new(db: Arc<Database>, config: Arc<Config>, http: reqwest::Client) -> Self {
        Self { db, config, http }
    }

    /// Record a notification and push it when delivery is configured.
    ///
    /// Every failure is logged; nothing is returned to the caller.
    pub async fn deliver(&self, pending: PendingNotification) {
        let notification = match self.db.notifications.append(&pending) {
            Ok(notification) => notification,
            Err(err) => {
                tracing::warn!(
                    recipient_id = %pending.recipient_id,
                    kind = pending.kind.as_str(),
                    "Failed to record notification: {}",
                    err
                );
                return;
            }
        };

        if !self.config.push_notifications {
            return;
        }
        let Some(details) = self.push_details_for(&notification.recipient_id) else {
            return;
        };
        self.push(&notification, &details).await;
    }

    fn push_details_for(&self, recipient_id: &str) -> Option<NotificationDetails> {
        let user = match self.db.users.get(recipient_id) {
            Ok(Some(user)) => user,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(recipient_id, "Recipient lookup for push failed: {}", err);
                return None;
            }
        };
        match self.db.push_tokens.get(user.fid) {
            Ok(details) => details,
            Err(err) => {
                tracing::warn!(fid = user.fid, "Push token lookup failed: {}", err);
                None
            }
        }
    }

    async fn push(&self, notification: &Notification, details: &NotificationDetails) {
        let body = PushRequest::new(notification, &self.config.app_url, &details.token);
        match self.http.post(&details.url).json(&body).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(notification_id = %notification.id, "Push delivered");
            }
            Ok(response) => {
                tracing::warn!(
                    notification_id = %notification.id,
                    status = %response.status(),
                    "Push endpoint rejected notification"
                );
            }
            Err(err) => {
                tracing::warn!(
                    notification_id = %notification.id,
                    "Push delivery failed: {}",
                    err
                );
            }
        }
    }
}

impl PostCommitHook for SpawnedNotifier {
    fn after_commit(&self, pending: PendingNotification) {
        let notifier = self.clone();
        tokio::spawn(async move {
            notifier.deliver(pending).await;
        });
    }
}
