//! Shared constants used across Upcast crates.

/// Default API port for Upcast.
pub const DEFAULT_PORT: u16 = 38420;

/// Default maximum request body accepted by the API layer.
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Default timeout for outbound push delivery, in milliseconds.
pub const DEFAULT_PUSH_TIMEOUT_MS: u64 = 3_000;

/// Default and maximum page sizes for list endpoints.
pub const DEFAULT_PAGE_LIMIT: usize = 20;
/// Upper bound applied to every caller-supplied `limit`.
pub const MAX_PAGE_LIMIT: usize = 100;

/// Field length limits enforced on create/update payloads.
pub const MAX_PROJECT_NAME_LEN: usize = 100;
/// Maximum tagline length in characters.
pub const MAX_TAGLINE_LEN: usize = 200;
/// Maximum comment body length in characters.
pub const MAX_COMMENT_LEN: usize = 1_000;

/// Display name used in notification text when the actor row is missing.
pub const FALLBACK_ACTOR_NAME: &str = "Someone";

/// Default base URL for CLI/API clients.
pub const DEFAULT_CLI_SERVER_URL: &str = "http://localhost:38420";
