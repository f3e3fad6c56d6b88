//! Timestamp helpers for ordered index keys.

use chrono::{DateTime, Utc};

/// Unix millis, clamped to zero for pre-epoch values.
pub(crate) fn timestamp_key(at: DateTime<Utc>) -> u64 {
    at.timestamp_millis().max(0) as u64
}

/// Key that sorts newest first under ascending iteration.
pub(crate) fn reverse_timestamp_key(at: DateTime<Utc>) -> u64 {
    u64::MAX.saturating_sub(timestamp_key(at))
}
