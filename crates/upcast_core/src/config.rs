//! Configuration loading from environment variables.

use crate::constants::{DEFAULT_MAX_BODY_SIZE, DEFAULT_PORT, DEFAULT_PUSH_TIMEOUT_MS};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Runtime configuration for Upcast.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub db_path: String,
    pub port: u16,
    pub max_body_size: usize,
    /// Public URL of the mini-app, used as the push notification target.
    pub app_url: String,
    pub push_notifications: bool,
    pub push_timeout_ms: u64,
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    for key in ["HOME", "USERPROFILE"] {
        if let Ok(home) = env::var(key) {
            if !home.trim().is_empty() {
                return Some(PathBuf::from(home));
            }
        }
    }
    std::env::current_dir().ok()
}

/// Parse a boolean-like environment flag value.
///
/// Truthy values are `1`, `true`, `yes`, `on`; falsy values are `0`, `false`,
/// `no`, `off` and the empty string. Matching ignores case and surrounding
/// whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Invalid {}='{}'; using default", name, raw);
            None
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        let port = parsed_var("PORT").unwrap_or(DEFAULT_PORT);
        Self {
            db_path: env::var("DB_PATH").map(expand_tilde).unwrap_or_else(|_| {
                let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
                home.join(".cache")
                    .join("upcast")
                    .join("db")
                    .to_string_lossy()
                    .to_string()
            }),
            port,
            max_body_size: parsed_var("MAX_BODY_SIZE").unwrap_or(DEFAULT_MAX_BODY_SIZE),
            app_url: env::var("APP_URL")
                .ok()
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| format!("http://localhost:{}", port)),
            push_notifications: env_flag_enabled("PUSH_NOTIFICATIONS"),
            push_timeout_ms: parsed_var("PUSH_TIMEOUT_MS").unwrap_or(DEFAULT_PUSH_TIMEOUT_MS),
        }
    }
}
