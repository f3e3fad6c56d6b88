//! Comment storage operations backed by redb.

use super::tables::{COMMENTS, COMMENTS_BY_PROJECT, PROJECTS, USERS};
use super::time_util::timestamp_key;
use super::{decode, Database};
use crate::constants::MAX_COMMENT_LEN;
use crate::models::comment::{Comment, CreateCommentRequest};
use crate::models::project::Project;
use crate::models::user::User;
use crate::notify::{PendingNotification, PostCommitHook};
use crate::{error::AppError, models};
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

/// Accessor for comment tables.
pub struct CommentDb {
    db: Arc<redb::Database>,
}

impl CommentDb {
    pub(super) fn new(db: Arc<redb::Database>) -> Self {
        Self { db }
    }

    /// Insert a comment after checking its project and author exist.
    ///
    /// # Returns
    /// The stored comment with the project and author rows read in the same
    /// transaction.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] for blank or oversized bodies and
    /// [`AppError::NotFound`] for a missing project or user.
    pub fn create(
        &self,
        project_id: &str,
        req: CreateCommentRequest,
    ) -> Result<(Comment, Project, User), AppError> {
        let body = models::required_text(&req.body, "body")?;
        models::check_len(&body, MAX_COMMENT_LEN, "body")?;
        let user_id = models::required_text(&req.user_id, "user_id")?;
        let comment = Comment::new(project_id.to_string(), user_id, body);
        let encoded = bincode::serialize(&comment)?;

        let write_txn = self.db.begin_write()?;
        let rows = {
            let projects = write_txn.open_table(PROJECTS)?;
            let users = write_txn.open_table(USERS)?;
            let mut comments = write_txn.open_table(COMMENTS)?;
            let mut by_project = write_txn.open_table(COMMENTS_BY_PROJECT)?;

            let project: Project = match projects.get(project_id)? {
                Some(guard) => decode(guard.value())?,
                None => return Err(AppError::not_found("project not found")),
            };
            let author: User = match users.get(comment.user_id.as_str())? {
                Some(guard) => decode(guard.value())?,
                None => return Err(AppError::not_found("user not found")),
            };

            comments.insert(comment.id.as_str(), encoded.as_slice())?;
            by_project.insert(
                (
                    project_id,
                    timestamp_key(comment.created_at),
                    comment.id.as_str(),
                ),
                (),
            )?;
            (project, author)
        };
        write_txn.commit()?;
        Ok((comment, rows.0, rows.1))
    }

    /// List a project's comments, oldest first.
    pub fn list_for_project(&self, project_id: &str) -> Result<Vec<Comment>, AppError> {
        let read_txn = self.db.begin_read()?;
        let comments = read_txn.open_table(COMMENTS)?;
        let by_project = read_txn.open_table(COMMENTS_BY_PROJECT)?;
        let mut listed = Vec::new();
        for item in by_project.range((project_id, 0u64, "")..)? {
            let (key, _) = item?;
            let (owner, _, comment_id) = key.value();
            if owner != project_id {
                break;
            }
            if let Some(guard) = comments.get(comment_id)? {
                listed.push(decode(guard.value())?);
            }
        }
        Ok(listed)
    }

    /// Delete a comment written by `user_id`.
    ///
    /// # Returns
    /// `true` when removed; `false` when missing or written by someone else.
    pub fn delete(&self, comment_id: &str, user_id: &str) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut comments = write_txn.open_table(COMMENTS)?;
            let mut by_project = write_txn.open_table(COMMENTS_BY_PROJECT)?;

            let Some(guard) = comments.get(comment_id)? else {
                return Ok(false);
            };
            let comment: Comment = decode(guard.value())?;
            drop(guard);
            if comment.user_id != user_id {
                return Ok(false);
            }

            let _ = by_project.remove((
                comment.project_id.as_str(),
                timestamp_key(comment.created_at),
                comment_id,
            ))?;
            let _ = comments.remove(comment_id)?;
        }
        write_txn.commit()?;
        Ok(true)
    }
}

/// Store a comment and notify the project owner after commit.
///
/// Commenting on your own project produces no notification.
///
/// # Errors
/// Propagates validation, not-found, and storage errors from
/// [`CommentDb::create`]. The hook cannot fail the call.
pub fn post_comment(
    db: &Database,
    project_id: &str,
    req: CreateCommentRequest,
    hook: &dyn PostCommitHook,
) -> Result<Comment, AppError> {
    let (comment, project, author) = db.comments.create(project_id, req)?;
    if project.creator_id != comment.user_id {
        hook.after_commit(PendingNotification::comment(
            author.label(),
            &project,
            &comment,
        ));
    }
    Ok(comment)
}
