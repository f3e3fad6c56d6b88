//! User storage operations backed by redb.

use super::decode;
use super::tables::{USERS, USERS_BY_FID};
use crate::{error::AppError, models::user::*};
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

/// Accessor for user tables.
pub struct UserDb {
    db: Arc<redb::Database>,
}

impl UserDb {
    pub(super) fn new(db: Arc<redb::Database>) -> Self {
        Self { db }
    }

    /// Create or refresh a user from a Farcaster sign-in payload.
    ///
    /// The fid index is checked and written in the same transaction, so
    /// concurrent sign-ins for one fid converge on a single row.
    ///
    /// # Returns
    /// The stored user and `true` when the row was newly created.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] for a zero fid or blank username.
    pub fn upsert_by_fid(&self, req: &UpsertUserRequest) -> Result<(User, bool), AppError> {
        if req.fid == 0 {
            return Err(AppError::validation("fid must be positive"));
        }
        crate::models::required_text(&req.username, "username")?;

        let write_txn = self.db.begin_write()?;
        let result = {
            let mut users = write_txn.open_table(USERS)?;
            let mut by_fid = write_txn.open_table(USERS_BY_FID)?;

            let existing_id = by_fid.get(req.fid)?.map(|guard| guard.value().to_string());
            let existing = match existing_id.as_deref() {
                Some(id) => users
                    .get(id)?
                    .map(|guard| decode::<User>(guard.value()))
                    .transpose()?,
                None => None,
            };

            let created = existing.is_none();
            let mut user = existing.unwrap_or_else(|| User::new(req.fid, String::new()));
            user.apply_profile(req);

            let encoded = bincode::serialize(&user)?;
            users.insert(user.id.as_str(), encoded.as_slice())?;
            if created {
                by_fid.insert(user.fid, user.id.as_str())?;
            }
            (user, created)
        };
        write_txn.commit()?;

        if result.1 {
            tracing::info!(fid = result.0.fid, user_id = %result.0.id, "Registered new user");
        }
        Ok(result)
    }

    /// Fetch a user by internal id.
    pub fn get(&self, id: &str) -> Result<Option<User>, AppError> {
        let read_txn = self.db.begin_read()?;
        let users = read_txn.open_table(USERS)?;
        users
            .get(id)?
            .map(|guard| decode(guard.value()))
            .transpose()
    }

    /// Fetch a user by Farcaster fid.
    pub fn get_by_fid(&self, fid: u64) -> Result<Option<User>, AppError> {
        let read_txn = self.db.begin_read()?;
        let by_fid = read_txn.open_table(USERS_BY_FID)?;
        let Some(id_guard) = by_fid.get(fid)? else {
            return Ok(None);
        };
        let users = read_txn.open_table(USERS)?;
        let user = users
            .get(id_guard.value())?
            .map(|guard| decode(guard.value()))
            .transpose()?;
        Ok(user)
    }
}
