//! Project models and list query parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A listed product.
///
/// `upvote_count` and `save_count` are denormalized membership counts. They
/// are written only by [`crate::db::ToggleOps`]; no request type carries them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub website_url: Option<String>,
    pub image_url: Option<String>,
    pub category_id: Option<String>,
    /// Owning user; receives upvote and comment notifications.
    pub creator_id: String,
    pub upvote_count: u64,
    pub save_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub tagline: String,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub image_url: Option<String>,
    pub category_id: Option<String>,
    pub creator_id: String,
}

/// Metadata patch. Empty strings clear optional fields.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub image_url: Option<String>,
    pub category_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProjectSort {
    #[default]
    Recent,
    Top,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListProjectsQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub category_id: Option<String>,
    pub creator_id: Option<String>,
    pub sort: Option<ProjectSort>,
}

impl Project {
    pub fn new(name: String, tagline: String, creator_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            tagline,
            description: String::new(),
            website_url: None,
            image_url: None,
            category_id: None,
            creator_id,
            upvote_count: 0,
            save_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
