//! Shared test-only helpers for upcast_core.

use crate::constants::MAX_PAGE_LIMIT;
use crate::db::toggle::TargetRow;
use crate::models::creator::{CreateCreatorRequest, Creator};
use crate::models::project::{CreateProjectRequest, ListProjectsQuery, Project};
use crate::models::user::{UpsertUserRequest, User};
use crate::notify::{PendingNotification, PostCommitHook};
use crate::{Database, Ledger, ToggleOps};
use std::sync::Mutex;
use tempfile::TempDir;

/// Creates an isolated temporary database and returns it with the temp dir.
///
/// Keep the [`TempDir`] alive for the full test to preserve the backing files.
///
/// # Panics
/// Panics if temp-dir creation, path conversion, or database initialization
/// fails in the test environment.
pub(crate) fn setup_temp_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let db_path = temp_dir.path().join("test.db");
    let db = Database::new(db_path.to_str().expect("db path")).expect("db");
    (db, temp_dir)
}

pub(crate) fn seed_user(db: &Database, fid: u64, username: &str) -> User {
    let (user, _) = db
        .users
        .upsert_by_fid(&UpsertUserRequest {
            fid,
            username: username.to_string(),
            display_name: None,
            pfp_url: None,
            bio: None,
        })
        .expect("seed user");
    user
}

pub(crate) fn seed_project(db: &Database, owner: &User, name: &str) -> Project {
    db.projects
        .create(CreateProjectRequest {
            name: name.to_string(),
            tagline: format!("{} tagline", name),
            description: None,
            website_url: None,
            image_url: None,
            category_id: None,
            creator_id: owner.id.clone(),
        })
        .expect("seed project")
}

pub(crate) fn seed_creator(db: &Database, owner: &User) -> Creator {
    db.creators
        .create(CreateCreatorRequest {
            user_id: owner.id.clone(),
            name: owner.username.clone(),
            bio: None,
            avatar_url: None,
        })
        .expect("seed creator")
}

/// Hook that keeps every notification it receives.
#[derive(Default)]
pub(crate) struct RecordingHook {
    received: Mutex<Vec<PendingNotification>>,
}

impl RecordingHook {
    pub(crate) fn take(&self) -> Vec<PendingNotification> {
        std::mem::take(&mut *self.received.lock().expect("hook lock"))
    }
}

impl PostCommitHook for RecordingHook {
    fn after_commit(&self, pending: PendingNotification) {
        self.received.lock().expect("hook lock").push(pending);
    }
}

/// Asserts that every ledger counter equals its membership row count.
///
/// # Panics
/// Panics when a scan fails or any counter has drifted.
pub(crate) fn assert_counters_match_memberships(db: &Database) {
    for ledger in Ledger::ALL {
        for target in ledger_targets(db, ledger) {
            let id = match &target {
                TargetRow::Project(project) => project.id.clone(),
                TargetRow::Creator(creator) => creator.id.clone(),
            };
            let expected = ToggleOps::membership_count(db, ledger, &id).expect("count");
            assert_eq!(
                target.counter(ledger),
                expected,
                "{} counter drift for target {}",
                ledger.name(),
                id
            );
        }
    }
}

fn ledger_targets(db: &Database, ledger: Ledger) -> Vec<TargetRow> {
    match ledger {
        Ledger::ProjectUpvote | Ledger::ProjectSave => db
            .projects
            .list(&ListProjectsQuery {
                limit: Some(MAX_PAGE_LIMIT),
                ..Default::default()
            })
            .expect("list projects")
            .into_iter()
            .map(TargetRow::Project)
            .collect(),
        Ledger::CreatorUpvote => db
            .creators
            .list(usize::MAX)
            .expect("list creators")
            .into_iter()
            .map(TargetRow::Creator)
            .collect(),
    }
}
