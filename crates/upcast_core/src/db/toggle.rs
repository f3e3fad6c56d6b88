//! Membership toggles with denormalized counters.
//!
//! Each [`Ledger`] pairs a membership table keyed by `(actor_id, target_id)`
//! with the counter field it owns on the target row. The membership row and
//! the counter change in the same write transaction, and redb serializes
//! write transactions, so the counter always equals the number of membership
//! rows for its target.

use super::tables::{CREATORS, CREATOR_UPVOTES, PROJECTS, PROJECT_UPVOTES, SAVED_PROJECTS};
use super::{decode, Database};
use crate::error::AppError;
use crate::models::creator::Creator;
use crate::models::project::Project;
use crate::notify::{actor_display_name, PendingNotification, PostCommitHook};
use chrono::Utc;
use redb::{ReadableDatabase, ReadableTable, TableDefinition};
use serde::Serialize;
use std::collections::HashMap;

type MembershipTable = TableDefinition<'static, (&'static str, &'static str), i64>;
type TargetTable = TableDefinition<'static, &'static str, &'static [u8]>;

/// A membership relation and the counter it maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ledger {
    /// User upvotes a project; owns `Project.upvote_count`.
    ProjectUpvote,
    /// User upvotes a creator profile; owns `Creator.upvote_count`.
    CreatorUpvote,
    /// User bookmarks a project; owns `Project.save_count`.
    ProjectSave,
}

impl Ledger {
    pub const ALL: [Ledger; 3] = [Self::ProjectUpvote, Self::CreatorUpvote, Self::ProjectSave];

    pub fn name(self) -> &'static str {
        match self {
            Self::ProjectUpvote => "project_upvote",
            Self::CreatorUpvote => "creator_upvote",
            Self::ProjectSave => "project_save",
        }
    }

    pub(crate) fn memberships(self) -> MembershipTable {
        match self {
            Self::ProjectUpvote => PROJECT_UPVOTES,
            Self::CreatorUpvote => CREATOR_UPVOTES,
            Self::ProjectSave => SAVED_PROJECTS,
        }
    }

    pub(crate) fn targets(self) -> TargetTable {
        match self {
            Self::ProjectUpvote | Self::ProjectSave => PROJECTS,
            Self::CreatorUpvote => CREATORS,
        }
    }

    /// Whether a new membership notifies the target owner.
    ///
    /// Saves are private bookmarks and stay silent.
    pub fn notifies(self) -> bool {
        !matches!(self, Self::ProjectSave)
    }
}

/// Net effect of one toggle call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    Added,
    Removed,
}

impl ToggleAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
        }
    }
}

/// Outcome of a single membership write inside a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipWrite {
    Inserted,
    /// The `(actor, target)` pair was already present.
    AlreadyExists,
    Removed,
    /// Nothing to remove; a concurrent call got there first.
    AlreadyAbsent,
}

/// Result of a counter repair pass over one ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecountReport {
    pub ledger: Ledger,
    pub targets_scanned: usize,
    pub targets_corrected: usize,
}

/// Decoded target row for a ledger.
#[derive(Debug, Clone)]
pub(crate) enum TargetRow {
    Project(Project),
    Creator(Creator),
}

impl TargetRow {
    fn decode(ledger: Ledger, bytes: &[u8]) -> Result<Self, AppError> {
        Ok(match ledger {
            Ledger::ProjectUpvote | Ledger::ProjectSave => Self::Project(decode(bytes)?),
            Ledger::CreatorUpvote => Self::Creator(decode(bytes)?),
        })
    }

    fn encode(&self) -> Result<Vec<u8>, AppError> {
        Ok(match self {
            Self::Project(project) => bincode::serialize(project)?,
            Self::Creator(creator) => bincode::serialize(creator)?,
        })
    }

    pub(crate) fn counter(&self, ledger: Ledger) -> u64 {
        match (self, ledger) {
            (Self::Project(project), Ledger::ProjectSave) => project.save_count,
            (Self::Project(project), _) => project.upvote_count,
            (Self::Creator(creator), _) => creator.upvote_count,
        }
    }

    fn set_counter(&mut self, ledger: Ledger, value: u64) {
        match (self, ledger) {
            (Self::Project(project), Ledger::ProjectSave) => project.save_count = value,
            (Self::Project(project), _) => project.upvote_count = value,
            (Self::Creator(creator), _) => creator.upvote_count = value,
        }
    }

    /// User who receives notifications about this target.
    pub(crate) fn owner_id(&self) -> &str {
        match self {
            Self::Project(project) => &project.creator_id,
            Self::Creator(creator) => &creator.user_id,
        }
    }

    fn upvote_notification(&self, actor_id: &str, actor_name: &str) -> PendingNotification {
        match self {
            Self::Project(project) => {
                PendingNotification::project_upvote(actor_id, actor_name, project)
            }
            Self::Creator(creator) => {
                PendingNotification::creator_upvote(actor_id, actor_name, creator)
            }
        }
    }
}

/// Insert `(actor, target)` unless it already exists.
pub(crate) fn insert_membership(
    table: &mut redb::Table<(&str, &str), i64>,
    actor_id: &str,
    target_id: &str,
) -> Result<MembershipWrite, AppError> {
    if table.get((actor_id, target_id))?.is_some() {
        return Ok(MembershipWrite::AlreadyExists);
    }
    table.insert((actor_id, target_id), Utc::now().timestamp_millis())?;
    Ok(MembershipWrite::Inserted)
}

pub(crate) fn remove_membership(
    table: &mut redb::Table<(&str, &str), i64>,
    actor_id: &str,
    target_id: &str,
) -> Result<MembershipWrite, AppError> {
    let removed = table.remove((actor_id, target_id))?.is_some();
    Ok(if removed {
        MembershipWrite::Removed
    } else {
        MembershipWrite::AlreadyAbsent
    })
}

/// Add a membership and bump the target counter in one write transaction.
///
/// `AlreadyExists` aborts the transaction, leaving the store unchanged.
///
/// # Errors
/// Returns [`AppError::NotFound`] when the target is missing inside the
/// transaction.
pub(crate) fn apply_add(
    db: &Database,
    ledger: Ledger,
    actor_id: &str,
    target_id: &str,
) -> Result<(MembershipWrite, TargetRow), AppError> {
    let write_txn = db.db.begin_write()?;
    let (outcome, row) = {
        let mut targets = write_txn.open_table(ledger.targets())?;
        let mut memberships = write_txn.open_table(ledger.memberships())?;

        let Some(guard) = targets.get(target_id)? else {
            return Err(AppError::not_found("target not found"));
        };
        let mut row = TargetRow::decode(ledger, guard.value())?;
        drop(guard);

        let outcome = insert_membership(&mut memberships, actor_id, target_id)?;
        if outcome == MembershipWrite::Inserted {
            row.set_counter(ledger, row.counter(ledger).saturating_add(1));
            let encoded = row.encode()?;
            targets.insert(target_id, encoded.as_slice())?;
        }
        (outcome, row)
    };

    if outcome == MembershipWrite::Inserted {
        write_txn.commit()?;
    } else {
        write_txn.abort()?;
    }
    Ok((outcome, row))
}

/// Remove a membership and decrement the target counter in one write
/// transaction. The counter saturates at zero.
pub(crate) fn apply_remove(
    db: &Database,
    ledger: Ledger,
    actor_id: &str,
    target_id: &str,
) -> Result<MembershipWrite, AppError> {
    let write_txn = db.db.begin_write()?;
    let outcome = {
        let mut targets = write_txn.open_table(ledger.targets())?;
        let mut memberships = write_txn.open_table(ledger.memberships())?;

        let Some(guard) = targets.get(target_id)? else {
            return Err(AppError::not_found("target not found"));
        };
        let mut row = TargetRow::decode(ledger, guard.value())?;
        drop(guard);

        let outcome = remove_membership(&mut memberships, actor_id, target_id)?;
        if outcome == MembershipWrite::Removed {
            row.set_counter(ledger, row.counter(ledger).saturating_sub(1));
            let encoded = row.encode()?;
            targets.insert(target_id, encoded.as_slice())?;
        }
        outcome
    };

    if outcome == MembershipWrite::Removed {
        write_txn.commit()?;
    } else {
        write_txn.abort()?;
    }
    Ok(outcome)
}

/// Toggle, repair, and read operations over membership ledgers.
pub struct ToggleOps;

impl ToggleOps {
    /// Flip `actor_id`'s membership on `target_id`.
    ///
    /// # Arguments
    /// - `db`: Open database handle.
    /// - `ledger`: Which relation to toggle.
    /// - `actor_id`: User performing the toggle.
    /// - `target_id`: Project or creator being toggled.
    /// - `hook`: Receives the owner notification after a committed add.
    ///
    /// # Returns
    /// [`ToggleAction::Added`] or [`ToggleAction::Removed`]. A lost insert
    /// race still reports `Added`; only the winning call notifies.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] for blank ids, [`AppError::NotFound`]
    /// when the target does not exist, and storage errors otherwise.
    pub fn toggle(
        db: &Database,
        ledger: Ledger,
        actor_id: &str,
        target_id: &str,
        hook: &dyn PostCommitHook,
    ) -> Result<ToggleAction, AppError> {
        let actor_id = actor_id.trim();
        if actor_id.is_empty() {
            return Err(AppError::validation("actor id required"));
        }
        let target_id = target_id.trim();
        if target_id.is_empty() {
            return Err(AppError::validation("target id required"));
        }

        let is_member = {
            let read_txn = db.db.begin_read()?;
            let targets = read_txn.open_table(ledger.targets())?;
            if targets.get(target_id)?.is_none() {
                return Err(AppError::not_found("target not found"));
            }
            let memberships = read_txn.open_table(ledger.memberships())?;
            let present = memberships.get((actor_id, target_id))?.is_some();
            present
        };

        if is_member {
            let outcome = apply_remove(db, ledger, actor_id, target_id)?;
            tracing::debug!(
                ledger = ledger.name(),
                actor_id,
                target_id,
                ?outcome,
                "Toggled membership off"
            );
            return Ok(ToggleAction::Removed);
        }

        let (outcome, row) = apply_add(db, ledger, actor_id, target_id)?;
        tracing::debug!(
            ledger = ledger.name(),
            actor_id,
            target_id,
            ?outcome,
            "Toggled membership on"
        );
        if outcome == MembershipWrite::Inserted && ledger.notifies() && row.owner_id() != actor_id
        {
            let actor_name = actor_display_name(db, actor_id);
            hook.after_commit(row.upvote_notification(actor_id, &actor_name));
        }
        Ok(ToggleAction::Added)
    }

    /// Rewrite every counter of `ledger` from its membership rows.
    ///
    /// Runs in a single write transaction, so no toggle interleaves with the
    /// scan.
    pub fn recount(db: &Database, ledger: Ledger) -> Result<RecountReport, AppError> {
        let write_txn = db.db.begin_write()?;
        let report = {
            let memberships = write_txn.open_table(ledger.memberships())?;
            let mut targets = write_txn.open_table(ledger.targets())?;

            let mut counts: HashMap<String, u64> = HashMap::new();
            for item in memberships.iter()? {
                let (key, _) = item?;
                let (_, target_id) = key.value();
                *counts.entry(target_id.to_string()).or_default() += 1;
            }

            let mut rows = Vec::new();
            for item in targets.iter()? {
                let (key, value) = item?;
                rows.push((
                    key.value().to_string(),
                    TargetRow::decode(ledger, value.value())?,
                ));
            }

            let targets_scanned = rows.len();
            let mut targets_corrected = 0;
            for (target_id, mut row) in rows {
                let expected = counts.get(&target_id).copied().unwrap_or(0);
                let stored = row.counter(ledger);
                if stored == expected {
                    continue;
                }
                tracing::warn!(
                    ledger = ledger.name(),
                    target_id = %target_id,
                    stored,
                    expected,
                    "Correcting drifted counter"
                );
                row.set_counter(ledger, expected);
                let encoded = row.encode()?;
                targets.insert(target_id.as_str(), encoded.as_slice())?;
                targets_corrected += 1;
            }

            RecountReport {
                ledger,
                targets_scanned,
                targets_corrected,
            }
        };
        write_txn.commit()?;
        Ok(report)
    }

    pub fn is_member(
        db: &Database,
        ledger: Ledger,
        actor_id: &str,
        target_id: &str,
    ) -> Result<bool, AppError> {
        let read_txn = db.db.begin_read()?;
        let memberships = read_txn.open_table(ledger.memberships())?;
        let present = memberships.get((actor_id, target_id))?.is_some();
        Ok(present)
    }

    /// Count membership rows for one target.
    pub fn membership_count(
        db: &Database,
        ledger: Ledger,
        target_id: &str,
    ) -> Result<u64, AppError> {
        let read_txn = db.db.begin_read()?;
        let memberships = read_txn.open_table(ledger.memberships())?;
        let mut count = 0;
        for item in memberships.iter()? {
            let (key, _) = item?;
            if key.value().1 == target_id {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Targets `actor_id` holds a membership on, ordered by target id.
    pub fn targets_for_actor(
        db: &Database,
        ledger: Ledger,
        actor_id: &str,
    ) -> Result<Vec<String>, AppError> {
        let read_txn = db.db.begin_read()?;
        let memberships = read_txn.open_table(ledger.memberships())?;
        let mut target_ids = Vec::new();
        for item in memberships.range((actor_id, "")..)? {
            let (key, _) = item?;
            let (actor, target_id) = key.value();
            if actor != actor_id {
                break;
            }
            target_ids.push(target_id.to_string());
        }
        Ok(target_ids)
    }
}
