//! Farcaster mini-app webhook events (already signature-verified upstream).

use crate::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Push delivery endpoint and token granted by the Farcaster client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationDetails {
    pub url: String,
    pub token: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NotificationDetailsPayload {
    pub url: String,
    pub token: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MiniAppEvent {
    #[serde(alias = "frame_added")]
    MiniappAdded {
        #[serde(rename = "notificationDetails")]
        notification_details: Option<NotificationDetailsPayload>,
    },
    #[serde(alias = "frame_removed")]
    MiniappRemoved,
    NotificationsEnabled {
        #[serde(rename = "notificationDetails")]
        notification_details: NotificationDetailsPayload,
    },
    NotificationsDisabled,
}

/// Decoded webhook body: the sender's fid plus the event.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct WebhookEnvelope {
    pub fid: u64,
    pub event: MiniAppEvent,
}

impl WebhookEnvelope {
    /// Parse a decoded webhook body.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] for malformed bodies or unknown events.
    pub fn parse(value: serde_json::Value) -> Result<Self, AppError> {
        serde_json::from_value(value)
            .map_err(|err| AppError::validation(format!("invalid webhook payload: {}", err)))
    }
}

impl MiniAppEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MiniappAdded { .. } => "miniapp_added",
            Self::MiniappRemoved => "miniapp_removed",
            Self::NotificationsEnabled { .. } => "notifications_enabled",
            Self::NotificationsDisabled => "notifications_disabled",
        }
    }
}
