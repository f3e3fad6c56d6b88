//! redb table definitions shared by storage modules.

use redb::TableDefinition;

/// File name for the redb database within the configured DB directory.
pub const REDB_FILE_NAME: &str = "data.redb";

/// Canonical user rows (`User`, bincode-encoded).
pub const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");
/// Unique fid -> user id index.
pub const USERS_BY_FID: TableDefinition<u64, &str> = TableDefinition::new("users_by_fid");

pub const CATEGORIES: TableDefinition<&str, &[u8]> = TableDefinition::new("categories");
/// Unique slug -> category id index.
pub const CATEGORY_SLUGS: TableDefinition<&str, &str> = TableDefinition::new("category_slugs");

/// Canonical project rows (`Project`, bincode-encoded).
pub const PROJECTS: TableDefinition<&str, &[u8]> = TableDefinition::new("projects");
/// Recency index ordered by reverse-millis then id.
pub const PROJECTS_BY_CREATED: TableDefinition<(u64, &str), ()> =
    TableDefinition::new("projects_by_created");

pub const CREATORS: TableDefinition<&str, &[u8]> = TableDefinition::new("creators");
/// Unique user id -> creator id index (one profile per user).
pub const CREATORS_BY_USER: TableDefinition<&str, &str> = TableDefinition::new("creators_by_user");

pub const COMMENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("comments");
/// Per-project comment index ordered by (project id, created millis, comment id).
pub const COMMENTS_BY_PROJECT: TableDefinition<(&str, u64, &str), ()> =
    TableDefinition::new("comments_by_project");

/// Membership relations keyed by `(user_id, target_id)`; the value is the
/// creation time in unix millis. The tuple key is the uniqueness constraint.
pub const PROJECT_UPVOTES: TableDefinition<(&str, &str), i64> =
    TableDefinition::new("project_upvotes");
pub const CREATOR_UPVOTES: TableDefinition<(&str, &str), i64> =
    TableDefinition::new("creator_upvotes");
pub const SAVED_PROJECTS: TableDefinition<(&str, &str), i64> =
    TableDefinition::new("saved_projects");

/// Notification rows (`StoredNotification`, bincode-encoded).
pub const NOTIFICATIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("notifications");
/// Per-recipient index ordered newest first.
pub const NOTIFICATIONS_BY_RECIPIENT: TableDefinition<(&str, u64, &str), ()> =
    TableDefinition::new("notifications_by_recipient");

/// Mini-app push delivery details keyed by fid.
pub const PUSH_TOKENS: TableDefinition<u64, &[u8]> = TableDefinition::new("push_tokens");
