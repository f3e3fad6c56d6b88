//! Category storage operations backed by redb.

use super::decode;
use super::tables::{CATEGORIES, CATEGORY_SLUGS, PROJECTS};
use crate::models::category::{slugify, Category, CreateCategoryRequest};
use crate::models::project::Project;
use crate::{error::AppError, models};
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

/// Accessor for category tables.
pub struct CategoryDb {
    db: Arc<redb::Database>,
}

impl CategoryDb {
    pub(super) fn new(db: Arc<redb::Database>) -> Self {
        Self { db }
    }

    /// Insert a new category with a unique slug.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] for a blank name, an empty derived
    /// slug, or a slug that is already taken.
    pub fn create(&self, req: CreateCategoryRequest) -> Result<Category, AppError> {
        let name = models::required_text(&req.name, "name")?;
        let slug = slugify(req.slug.as_deref().unwrap_or(name.as_str()));
        if slug.is_empty() {
            return Err(AppError::validation(
                "category slug must contain letters or digits",
            ));
        }
        let category = Category::new(name, slug, models::optional_text(req.description));
        let encoded = bincode::serialize(&category)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut categories = write_txn.open_table(CATEGORIES)?;
            let mut slugs = write_txn.open_table(CATEGORY_SLUGS)?;
            if slugs.get(category.slug.as_str())?.is_some() {
                return Err(AppError::validation(format!(
                    "category slug '{}' already exists",
                    category.slug
                )));
            }
            slugs.insert(category.slug.as_str(), category.id.as_str())?;
            categories.insert(category.id.as_str(), encoded.as_slice())?;
        }
        write_txn.commit()?;
        Ok(category)
    }

    /// Fetch a category by id.
    pub fn get(&self, id: &str) -> Result<Option<Category>, AppError> {
        let read_txn = self.db.begin_read()?;
        let categories = read_txn.open_table(CATEGORIES)?;
        categories
            .get(id)?
            .map(|guard| decode(guard.value()))
            .transpose()
    }

    /// List all categories sorted by name.
    pub fn list(&self) -> Result<Vec<Category>, AppError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CATEGORIES)?;
        let mut categories = Vec::new();
        for item in table.iter()? {
            let (_, value) = item?;
            categories.push(decode::<Category>(value.value())?);
        }
        categories.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(categories)
    }

    /// Delete a category that no project references.
    ///
    /// # Returns
    /// `true` when a category was removed, `false` when it did not exist.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] while projects still reference it.
    pub fn delete(&self, id: &str) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut categories = write_txn.open_table(CATEGORIES)?;
            let mut slugs = write_txn.open_table(CATEGORY_SLUGS)?;
            let projects = write_txn.open_table(PROJECTS)?;

            let Some(guard) = categories.get(id)? else {
                return Ok(false);
            };
            let category: Category = decode(guard.value())?;
            drop(guard);

            for item in projects.iter()? {
                let (_, value) = item?;
                let project: Project = decode(value.value())?;
                if project.category_id.as_deref() == Some(id) {
                    return Err(AppError::validation(format!(
                        "category '{}' is still used by project '{}'",
                        category.name, project.name
                    )));
                }
            }

            let _ = categories.remove(id)?;
            let _ = slugs.remove(category.slug.as_str())?;
        }
        write_txn.commit()?;
        Ok(true)
    }
}
