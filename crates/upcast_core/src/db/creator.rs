//! Creator profile storage operations backed by redb.

use super::decode;
use super::tables::{CREATORS, CREATORS_BY_USER, USERS};
use crate::models::creator::{CreateCreatorRequest, Creator};
use crate::{error::AppError, models};
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

/// Accessor for creator tables.
pub struct CreatorDb {
    db: Arc<redb::Database>,
}

impl CreatorDb {
    pub(super) fn new(db: Arc<redb::Database>) -> Self {
        Self { db }
    }

    /// Create the creator profile for a user.
    ///
    /// # Errors
    /// Returns [`AppError::NotFound`] when the user is missing and
    /// [`AppError::Validation`] when the user already has a profile.
    pub fn create(&self, req: CreateCreatorRequest) -> Result<Creator, AppError> {
        let user_id = models::required_text(&req.user_id, "user_id")?;
        let name = models::required_text(&req.name, "name")?;
        let mut creator = Creator::new(user_id, name);
        creator.bio = models::optional_text(req.bio);
        creator.avatar_url = models::optional_text(req.avatar_url);
        let encoded = bincode::serialize(&creator)?;

        let write_txn = self.db.begin_write()?;
        {
            let users = write_txn.open_table(USERS)?;
            let mut creators = write_txn.open_table(CREATORS)?;
            let mut by_user = write_txn.open_table(CREATORS_BY_USER)?;

            if users.get(creator.user_id.as_str())?.is_none() {
                return Err(AppError::not_found("user not found"));
            }
            if by_user.get(creator.user_id.as_str())?.is_some() {
                return Err(AppError::validation("user already has a creator profile"));
            }
            by_user.insert(creator.user_id.as_str(), creator.id.as_str())?;
            creators.insert(creator.id.as_str(), encoded.as_slice())?;
        }
        write_txn.commit()?;
        Ok(creator)
    }

    /// Fetch a creator profile by id.
    pub fn get(&self, id: &str) -> Result<Option<Creator>, AppError> {
        let read_txn = self.db.begin_read()?;
        let creators = read_txn.open_table(CREATORS)?;
        creators
            .get(id)?
            .map(|guard| decode(guard.value()))
            .transpose()
    }

    /// List creator profiles, most upvoted first.
    pub fn list(&self, limit: usize) -> Result<Vec<Creator>, AppError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CREATORS)?;
        let mut creators = Vec::new();
        for item in table.iter()? {
            let (_, value) = item?;
            creators.push(decode::<Creator>(value.value())?);
        }
        creators.sort_by(|a, b| {
            b.upvote_count
                .cmp(&a.upvote_count)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        creators.truncate(limit);
        Ok(creators)
    }
}
