//! Database layer and transactional helpers for Upcast.

/// Category storage helpers.
pub mod category;
/// Comment storage helpers.
pub mod comment;
/// Creator profile storage helpers.
pub mod creator;
/// Notification storage helpers.
pub mod notification;
/// Project storage helpers.
pub mod project;
/// Push token storage helpers.
pub mod push_token;
/// redb table definitions.
pub mod tables;
/// Membership toggles and counter repair.
pub mod toggle;
/// User storage helpers.
pub mod user;

pub(crate) mod time_util;

#[cfg(test)]
mod tests;

pub use toggle::{Ledger, MembershipWrite, RecountReport, ToggleAction, ToggleOps};

use crate::error::AppError;
use std::path::Path;
use std::sync::Arc;
use tables::*;

/// Database handle with typed accessors over one shared redb instance.
pub struct Database {
    pub db: Arc<redb::Database>,
    pub users: user::UserDb,
    pub categories: category::CategoryDb,
    pub projects: project::ProjectDb,
    pub creators: creator::CreatorDb,
    pub comments: comment::CommentDb,
    pub notifications: notification::NotificationDb,
    pub push_tokens: push_token::PushTokenDb,
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, AppError> {
    Ok(bincode::deserialize(bytes)?)
}

fn ensure_tables(db: &redb::Database) -> Result<(), AppError> {
    let write_txn = db.begin_write()?;
    write_txn.open_table(USERS)?;
    write_txn.open_table(USERS_BY_FID)?;
    write_txn.open_table(CATEGORIES)?;
    write_txn.open_table(CATEGORY_SLUGS)?;
    write_txn.open_table(PROJECTS)?;
    write_txn.open_table(PROJECTS_BY_CREATED)?;
    write_txn.open_table(CREATORS)?;
    write_txn.open_table(CREATORS_BY_USER)?;
    write_txn.open_table(COMMENTS)?;
    write_txn.open_table(COMMENTS_BY_PROJECT)?;
    write_txn.open_table(PROJECT_UPVOTES)?;
    write_txn.open_table(CREATOR_UPVOTES)?;
    write_txn.open_table(SAVED_PROJECTS)?;
    write_txn.open_table(NOTIFICATIONS)?;
    write_txn.open_table(NOTIFICATIONS_BY_RECIPIENT)?;
    write_txn.open_table(PUSH_TOKENS)?;
    write_txn.commit()?;
    Ok(())
}

impl Database {
    /// Build a database handle from an existing shared redb instance.
    ///
    /// # Returns
    /// A new [`Database`] wrapper that shares the underlying store.
    pub fn from_shared(db: Arc<redb::Database>) -> Self {
        Self {
            users: user::UserDb::new(db.clone()),
            categories: category::CategoryDb::new(db.clone()),
            projects: project::ProjectDb::new(db.clone()),
            creators: creator::CreatorDb::new(db.clone()),
            comments: comment::CommentDb::new(db.clone()),
            notifications: notification::NotificationDb::new(db.clone()),
            push_tokens: push_token::PushTokenDb::new(db.clone()),
            db,
        }
    }

    /// Clone this handle for another worker in the same process.
    ///
    /// redb allows one open handle per file, so workers share the instance.
    pub fn share(&self) -> Self {
        Self::from_shared(self.db.clone())
    }

    /// Open (or create) the store under `path` and initialize every table.
    ///
    /// # Arguments
    /// - `path`: Directory holding the redb file.
    ///
    /// # Returns
    /// A fully initialized [`Database`].
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created, another process
    /// holds the file, or table initialization fails.
    pub fn new(path: &str) -> Result<Self, AppError> {
        let dir = Path::new(path);
        std::fs::create_dir_all(dir).map_err(|err| {
            AppError::StorageMessage(format!(
                "Failed to create database directory '{}': {}",
                path, err
            ))
        })?;

        let file = dir.join(REDB_FILE_NAME);
        let db = match redb::Database::create(&file) {
            Ok(db) => db,
            Err(redb::DatabaseError::DatabaseAlreadyOpen) => {
                return Err(AppError::StorageMessage(format!(
                    "Database at '{}' is already open in another process.\n\
                    Stop the other upcast instance, or set DB_PATH to a different location.",
                    file.display()
                )));
            }
            Err(err) => return Err(err.into()),
        };

        ensure_tables(&db)?;
        tracing::debug!("Opened database at {}", file.display());
        Ok(Self::from_shared(Arc::new(db)))
    }
}
