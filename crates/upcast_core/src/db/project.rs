//! Project storage operations backed by redb.

use super::decode;
use super::tables::*;
use super::time_util::reverse_timestamp_key;
use crate::constants::{
    DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, MAX_PROJECT_NAME_LEN, MAX_TAGLINE_LEN,
};
use crate::models::project::*;
use crate::{error::AppError, models};
use chrono::Utc;
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

/// Accessor for project tables.
pub struct ProjectDb {
    db: Arc<redb::Database>,
}

/// Clamp a caller-supplied page size to `1..=MAX_PAGE_LIMIT`.
pub fn normalized_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT)
}

fn validate_name_and_tagline(name: &str, tagline: &str) -> Result<(), AppError> {
    models::check_len(name, MAX_PROJECT_NAME_LEN, "name")?;
    models::check_len(tagline, MAX_TAGLINE_LEN, "tagline")
}

fn ensure_category_exists(
    categories: &redb::Table<&str, &[u8]>,
    category_id: &str,
) -> Result<(), AppError> {
    if categories.get(category_id)?.is_none() {
        return Err(AppError::not_found("category not found"));
    }
    Ok(())
}

fn remove_memberships_for_target(
    table: &mut redb::Table<(&str, &str), i64>,
    target_id: &str,
) -> Result<usize, AppError> {
    let mut keys = Vec::new();
    for item in table.iter()? {
        let (key, _) = item?;
        let (actor, target) = key.value();
        if target == target_id {
            keys.push(actor.to_string());
        }
    }
    for actor in &keys {
        let _ = table.remove((actor.as_str(), target_id))?;
    }
    Ok(keys.len())
}

impl ProjectDb {
    pub(super) fn new(db: Arc<redb::Database>) -> Self {
        Self { db }
    }

    /// Insert a new project with zeroed counters.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] for blank or oversized fields, and
    /// [`AppError::NotFound`] when the creator user or category is missing.
    pub fn create(&self, req: CreateProjectRequest) -> Result<Project, AppError> {
        let name = models::required_text(&req.name, "name")?;
        let tagline = models::required_text(&req.tagline, "tagline")?;
        let creator_id = models::required_text(&req.creator_id, "creator_id")?;
        validate_name_and_tagline(&name, &tagline)?;

        let mut project = Project::new(name, tagline, creator_id);
        project.description = req.description.unwrap_or_default().trim().to_string();
        project.website_url = models::optional_text(req.website_url);
        project.image_url = models::optional_text(req.image_url);
        project.category_id = models::optional_text(req.category_id);

        let encoded = bincode::serialize(&project)?;
        let recency_key = reverse_timestamp_key(project.created_at);

        let write_txn = self.db.begin_write()?;
        {
            let users = write_txn.open_table(USERS)?;
            let categories = write_txn.open_table(CATEGORIES)?;
            let mut projects = write_txn.open_table(PROJECTS)?;
            let mut by_created = write_txn.open_table(PROJECTS_BY_CREATED)?;

            if users.get(project.creator_id.as_str())?.is_none() {
                return Err(AppError::not_found("user not found"));
            }
            if let Some(category_id) = project.category_id.as_deref() {
                ensure_category_exists(&categories, category_id)?;
            }

            projects.insert(project.id.as_str(), encoded.as_slice())?;
            by_created.insert((recency_key, project.id.as_str()), ())?;
        }
        write_txn.commit()?;
        Ok(project)
    }

    /// Fetch a project by id.
    pub fn get(&self, id: &str) -> Result<Option<Project>, AppError> {
        let read_txn = self.db.begin_read()?;
        let projects = read_txn.open_table(PROJECTS)?;
        projects
            .get(id)?
            .map(|guard| decode(guard.value()))
            .transpose()
    }

    /// Apply a metadata patch. Counters are never touched here.
    ///
    /// # Returns
    /// `Ok(Some(project))` when updated, `Ok(None)` when missing.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] for blank or oversized fields, and
    /// [`AppError::NotFound`] when a new category does not exist.
    pub fn update(&self, id: &str, req: UpdateProjectRequest) -> Result<Option<Project>, AppError> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let categories = write_txn.open_table(CATEGORIES)?;
            let mut projects = write_txn.open_table(PROJECTS)?;

            let Some(guard) = projects.get(id)? else {
                return Ok(None);
            };
            let mut project: Project = decode(guard.value())?;
            drop(guard);

            if let Some(name) = req.name.as_deref() {
                project.name = models::required_text(name, "name")?;
            }
            if let Some(tagline) = req.tagline.as_deref() {
                project.tagline = models::required_text(tagline, "tagline")?;
            }
            validate_name_and_tagline(&project.name, &project.tagline)?;
            if let Some(description) = req.description {
                project.description = description.trim().to_string();
            }
            if req.website_url.is_some() {
                project.website_url = models::optional_text(req.website_url);
            }
            if req.image_url.is_some() {
                project.image_url = models::optional_text(req.image_url);
            }
            if req.category_id.is_some() {
                project.category_id = models::optional_text(req.category_id);
                if let Some(category_id) = project.category_id.as_deref() {
                    ensure_category_exists(&categories, category_id)?;
                }
            }
            project.updated_at = Utc::now();

            let encoded = bincode::serialize(&project)?;
            projects.insert(id, encoded.as_slice())?;
            project
        };
        write_txn.commit()?;
        Ok(Some(updated))
    }

    /// Delete a project together with its comments and membership rows.
    ///
    /// Notifications that mention the project are history and are kept.
    ///
    /// # Returns
    /// `true` when a project was removed, `false` when missing.
    pub fn delete(&self, id: &str) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut projects = write_txn.open_table(PROJECTS)?;
            let mut by_created = write_txn.open_table(PROJECTS_BY_CREATED)?;
            let mut comments = write_txn.open_table(COMMENTS)?;
            let mut comments_by_project = write_txn.open_table(COMMENTS_BY_PROJECT)?;
            let mut upvotes = write_txn.open_table(PROJECT_UPVOTES)?;
            let mut saves = write_txn.open_table(SAVED_PROJECTS)?;

            let Some(guard) = projects.get(id)? else {
                return Ok(false);
            };
            let project: Project = decode(guard.value())?;
            drop(guard);

            let mut comment_keys = Vec::new();
            for item in comments_by_project.range((id, 0u64, "")..)? {
                let (key, _) = item?;
                let (project_id, created, comment_id) = key.value();
                if project_id != id {
                    break;
                }
                comment_keys.push((created, comment_id.to_string()));
            }
            for (created, comment_id) in &comment_keys {
                let _ = comments_by_project.remove((id, *created, comment_id.as_str()))?;
                let _ = comments.remove(comment_id.as_str())?;
            }

            let removed_upvotes = remove_memberships_for_target(&mut upvotes, id)?;
            let removed_saves = remove_memberships_for_target(&mut saves, id)?;

            let _ = by_created.remove((reverse_timestamp_key(project.created_at), id))?;
            let _ = projects.remove(id)?;

            tracing::info!(
                project_id = id,
                comments = comment_keys.len(),
                upvotes = removed_upvotes,
                saves = removed_saves,
                "Deleted project"
            );
        }
        write_txn.commit()?;
        Ok(true)
    }

    /// List projects with filters and offset pagination.
    ///
    /// `Recent` walks the recency index; `Top` orders by upvote count and then
    /// recency.
    pub fn list(&self, query: &ListProjectsQuery) -> Result<Vec<Project>, AppError> {
        let limit = normalized_limit(query.limit);
        let offset = query.offset.unwrap_or(0);
        let category = models::optional_text(query.category_id.clone());
        let creator = models::optional_text(query.creator_id.clone());
        let matches = |project: &Project| {
            category
                .as_deref()
                .map_or(true, |c| project.category_id.as_deref() == Some(c))
                && creator
                    .as_deref()
                    .map_or(true, |c| project.creator_id == c)
        };

        let read_txn = self.db.begin_read()?;
        let projects = read_txn.open_table(PROJECTS)?;
        let by_created = read_txn.open_table(PROJECTS_BY_CREATED)?;

        let mut ordered = Vec::new();
        for item in by_created.iter()? {
            let (key, _) = item?;
            let (_, project_id) = key.value();
            let Some(guard) = projects.get(project_id)? else {
                continue;
            };
            let project: Project = decode(guard.value())?;
            if matches(&project) {
                ordered.push(project);
            }
        }

        if query.sort.unwrap_or_default() == ProjectSort::Top {
            // Stable sort keeps the recency order among equal counts.
            ordered.sort_by(|a, b| b.upvote_count.cmp(&a.upvote_count));
        }

        Ok(ordered.into_iter().skip(offset).take(limit).collect())
    }

    /// Fetch several projects by id, skipping ids that no longer exist.
    pub fn get_many(&self, ids: &[String]) -> Result<Vec<Project>, AppError> {
        let read_txn = self.db.begin_read()?;
        let projects = read_txn.open_table(PROJECTS)?;
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(guard) = projects.get(id.as_str())? {
                found.push(decode(guard.value())?);
            }
        }
        Ok(found)
    }
}
