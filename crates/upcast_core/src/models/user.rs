use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A Farcaster user known to the app.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    /// Farcaster identity number; unique across users.
    pub fid: u64,
    pub username: String,
    pub display_name: Option<String>,
    pub pfp_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sign-in payload mirrored from the Farcaster SDK context.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertUserRequest {
    pub fid: u64,
    pub username: String,
    pub display_name: Option<String>,
    pub pfp_url: Option<String>,
    pub bio: Option<String>,
}

impl User {
    pub fn new(fid: u64, username: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            fid,
            username,
            display_name: None,
            pfp_url: None,
            bio: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Name shown in notification text.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(self.username.as_str())
    }

    pub(crate) fn apply_profile(&mut self, req: &UpsertUserRequest) {
        self.username = req.username.trim().to_string();
        self.display_name = super::optional_text(req.display_name.clone());
        self.pfp_url = super::optional_text(req.pfp_url.clone());
        self.bio = super::optional_text(req.bio.clone());
        self.updated_at = Utc::now();
    }
}
