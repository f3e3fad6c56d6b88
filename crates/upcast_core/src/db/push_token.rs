//! Mini-app push delivery details keyed by Farcaster fid.

use super::decode;
use super::tables::PUSH_TOKENS;
use crate::error::AppError;
use crate::models::webhook::{
    MiniAppEvent, NotificationDetails, NotificationDetailsPayload, WebhookEnvelope,
};
use chrono::Utc;
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

/// Accessor for the push token table.
pub struct PushTokenDb {
    db: Arc<redb::Database>,
}

impl PushTokenDb {
    pub(super) fn new(db: Arc<redb::Database>) -> Self {
        Self { db }
    }

    /// Store (or replace) the delivery details for `fid`.
    pub fn set(
        &self,
        fid: u64,
        payload: &NotificationDetailsPayload,
    ) -> Result<NotificationDetails, AppError> {
        let url = crate::models::required_text(&payload.url, "notificationDetails.url")?;
        let token = crate::models::required_text(&payload.token, "notificationDetails.token")?;
        let details = NotificationDetails {
            url,
            token,
            updated_at: Utc::now(),
        };
        let encoded = bincode::serialize(&details)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(PUSH_TOKENS)?;
            table.insert(fid, encoded.as_slice())?;
        }
        write_txn.commit()?;
        Ok(details)
    }

    /// Forget the delivery details for `fid`.
    ///
    /// # Returns
    /// `true` when details were present.
    pub fn clear(&self, fid: u64) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(PUSH_TOKENS)?;
            let removed = table.remove(fid)?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(removed)
    }

    pub fn get(&self, fid: u64) -> Result<Option<NotificationDetails>, AppError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PUSH_TOKENS)?;
        table
            .get(fid)?
            .map(|guard| decode(guard.value()))
            .transpose()
    }

    /// Apply a mini-app lifecycle event.
    ///
    /// Adding the app or enabling notifications stores the details carried by
    /// the event; removing the app or disabling notifications clears them.
    /// An add without details leaves any stored details untouched.
    ///
    /// # Returns
    /// `true` when stored details changed.
    pub fn apply_event(&self, envelope: &WebhookEnvelope) -> Result<bool, AppError> {
        if envelope.fid == 0 {
            return Err(AppError::validation("fid must be positive"));
        }
        match &envelope.event {
            MiniAppEvent::MiniappAdded {
                notification_details: Some(details),
            }
            | MiniAppEvent::NotificationsEnabled {
                notification_details: details,
            } => {
                self.set(envelope.fid, details)?;
                Ok(true)
            }
            MiniAppEvent::MiniappAdded {
                notification_details: None,
            } => Ok(false),
            MiniAppEvent::MiniappRemoved | MiniAppEvent::NotificationsDisabled => {
                self.clear(envelope.fid)
            }
        }
    }
}
