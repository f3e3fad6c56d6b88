use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub id: String,
    pub project_id: String,
    pub user_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub user_id: String,
    pub body: String,
}

impl Comment {
    pub fn new(project_id: String, user_id: String, body: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            project_id,
            user_id,
            body,
            created_at: Utc::now(),
        }
    }
}
