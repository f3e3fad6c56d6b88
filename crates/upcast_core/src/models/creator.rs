use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public creator profile owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Creator {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub upvote_count: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCreatorRequest {
    pub user_id: String,
    pub name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

impl Creator {
    pub fn new(user_id: String, name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            name,
            bio: None,
            avatar_url: None,
            upvote_count: 0,
            created_at: Utc::now(),
        }
    }
}
