//! Notification storage operations backed by redb.

use super::decode;
use super::tables::{NOTIFICATIONS, NOTIFICATIONS_BY_RECIPIENT};
use super::time_util::reverse_timestamp_key;
use crate::error::AppError;
use crate::models::notification::{Notification, StoredNotification};
use crate::notify::PendingNotification;
use chrono::Utc;
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;
use uuid::Uuid;

/// Accessor for notification tables.
pub struct NotificationDb {
    db: Arc<redb::Database>,
}

fn index_key(stored: &StoredNotification) -> (&str, u64, &str) {
    (
        stored.recipient_id.as_str(),
        reverse_timestamp_key(stored.created_at),
        stored.id.as_str(),
    )
}

impl NotificationDb {
    pub(super) fn new(db: Arc<redb::Database>) -> Self {
        Self { db }
    }

    /// Append exactly one unread notification event.
    ///
    /// # Returns
    /// The stored notification.
    pub fn append(&self, pending: &PendingNotification) -> Result<Notification, AppError> {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            recipient_id: pending.recipient_id.clone(),
            kind: pending.kind,
            title: pending.title.clone(),
            message: pending.message.clone(),
            payload: pending.payload.clone(),
            read: false,
            created_at: Utc::now(),
        };
        let stored = StoredNotification::from_notification(&notification);
        let encoded = bincode::serialize(&stored)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut rows = write_txn.open_table(NOTIFICATIONS)?;
            let mut by_recipient = write_txn.open_table(NOTIFICATIONS_BY_RECIPIENT)?;
            rows.insert(stored.id.as_str(), encoded.as_slice())?;
            by_recipient.insert(index_key(&stored), ())?;
        }
        write_txn.commit()?;
        Ok(notification)
    }

    /// List a recipient's notifications, newest first.
    pub fn list_for_recipient(
        &self,
        recipient_id: &str,
        limit: usize,
        unread_only: bool,
    ) -> Result<Vec<Notification>, AppError> {
        let read_txn = self.db.begin_read()?;
        let rows = read_txn.open_table(NOTIFICATIONS)?;
        let by_recipient = read_txn.open_table(NOTIFICATIONS_BY_RECIPIENT)?;

        let mut listed = Vec::new();
        for item in by_recipient.range((recipient_id, 0u64, "")..)? {
            if listed.len() >= limit {
                break;
            }
            let (key, _) = item?;
            let (owner, _, id) = key.value();
            if owner != recipient_id {
                break;
            }
            let Some(guard) = rows.get(id)? else {
                continue;
            };
            let stored: StoredNotification = decode(guard.value())?;
            if unread_only && stored.read {
                continue;
            }
            listed.push(stored.into_notification());
        }
        Ok(listed)
    }

    /// Count unread notifications for a recipient.
    pub fn unread_count(&self, recipient_id: &str) -> Result<usize, AppError> {
        let read_txn = self.db.begin_read()?;
        let rows = read_txn.open_table(NOTIFICATIONS)?;
        let by_recipient = read_txn.open_table(NOTIFICATIONS_BY_RECIPIENT)?;

        let mut unread = 0;
        for item in by_recipient.range((recipient_id, 0u64, "")..)? {
            let (key, _) = item?;
            let (owner, _, id) = key.value();
            if owner != recipient_id {
                break;
            }
            if let Some(guard) = rows.get(id)? {
                let stored: StoredNotification = decode(guard.value())?;
                if !stored.read {
                    unread += 1;
                }
            }
        }
        Ok(unread)
    }

    /// Mark one notification read.
    ///
    /// # Errors
    /// Returns [`AppError::NotFound`] when the notification does not exist or
    /// belongs to another recipient.
    pub fn mark_read(&self, id: &str, recipient_id: &str) -> Result<Notification, AppError> {
        let write_txn = self.db.begin_write()?;
        let notification = {
            let mut rows = write_txn.open_table(NOTIFICATIONS)?;
            let Some(guard) = rows.get(id)? else {
                return Err(AppError::not_found("notification not found"));
            };
            let mut stored: StoredNotification = decode(guard.value())?;
            drop(guard);
            if stored.recipient_id != recipient_id {
                return Err(AppError::not_found("notification not found"));
            }
            if !stored.read {
                stored.read = true;
                let encoded = bincode::serialize(&stored)?;
                rows.insert(id, encoded.as_slice())?;
            }
            stored.into_notification()
        };
        write_txn.commit()?;
        Ok(notification)
    }

    /// Mark every notification of a recipient read.
    ///
    /// # Returns
    /// Number of notifications that changed state.
    pub fn mark_all_read(&self, recipient_id: &str) -> Result<usize, AppError> {
        let write_txn = self.db.begin_write()?;
        let changed = {
            let mut rows = write_txn.open_table(NOTIFICATIONS)?;
            let by_recipient = write_txn.open_table(NOTIFICATIONS_BY_RECIPIENT)?;

            let mut ids = Vec::new();
            for item in by_recipient.range((recipient_id, 0u64, "")..)? {
                let (key, _) = item?;
                let (owner, _, id) = key.value();
                if owner != recipient_id {
                    break;
                }
                ids.push(id.to_string());
            }

            let mut changed = 0;
            for id in ids {
                let Some(guard) = rows.get(id.as_str())? else {
                    continue;
                };
                let mut stored: StoredNotification = decode(guard.value())?;
                drop(guard);
                if stored.read {
                    continue;
                }
                stored.read = true;
                let encoded = bincode::serialize(&stored)?;
                rows.insert(id.as_str(), encoded.as_slice())?;
                changed += 1;
            }
            changed
        };
        write_txn.commit()?;
        Ok(changed)
    }
}
