//! Core domain library for Upcast (config, storage, models, toggle ledger).

/// Configuration loading and defaults.
pub mod config;
/// Shared constants used across Upcast crates.
pub mod constants;
/// Database access layer and transactions.
pub mod db;
/// Process-global environment helpers.
pub mod env;
/// Application error types (storage/domain).
pub mod error;
/// Data models for API requests and persistence.
pub mod models;
/// Post-commit notification emission.
pub mod notify;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use constants::{DEFAULT_CLI_SERVER_URL, DEFAULT_PORT};
pub use db::{Database, Ledger, ToggleAction, ToggleOps};
pub use error::AppError;
pub use notify::{InlineNotifier, PendingNotification, PostCommitHook};
