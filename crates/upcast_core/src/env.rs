//! Process-global environment helpers shared by config code and tests.

use std::sync::{Mutex, OnceLock};

/// Lock that serializes environment mutation across test threads.
pub fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

#[allow(unused_unsafe)]
fn write_var(key: &str, value: Option<&str>) {
    // SAFETY: callers hold `env_lock()` while tests run in parallel.
    unsafe {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
}

/// Scoped override of one environment variable.
///
/// The previous value (or its absence) is restored on drop.
pub struct EnvGuard {
    key: String,
    previous: Option<String>,
}

impl EnvGuard {
    /// Set `key=value` for the lifetime of the guard.
    pub fn set(key: &str, value: &str) -> Self {
        Self::replace(key, Some(value))
    }

    /// Unset `key` for the lifetime of the guard.
    pub fn remove(key: &str) -> Self {
        Self::replace(key, None)
    }

    fn replace(key: &str, value: Option<&str>) -> Self {
        let previous = std::env::var(key).ok();
        write_var(key, value);
        Self {
            key: key.to_string(),
            previous,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        write_var(self.key.as_str(), self.previous.as_deref());
    }
}

#[cfg(test)]
mod tests {
    use super::{env_lock, EnvGuard};

    #[test]
    fn nested_guards_restore_in_order() {
        let _lock = env_lock().lock().expect("env lock");
        let key = "UPCAST_TEST_ENV_GUARD_NESTED";
        let _outer = EnvGuard::set(key, "outer");
        {
            let _inner = EnvGuard::remove(key);
            assert!(std::env::var(key).is_err());
        }
        assert_eq!(std::env::var(key).ok().as_deref(), Some("outer"));
    }
}
