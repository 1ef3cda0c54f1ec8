//! Helpers shared by the unit tests.

use tokio::sync::{Mutex, MutexGuard};

/// Serialises tests that read or write process environment variables.
static ENV_LOCK: Mutex<()> = Mutex::const_new(());

pub(crate) async fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().await
}

pub(crate) fn env_lock_blocking() -> MutexGuard<'static, ()> {
    ENV_LOCK.blocking_lock()
}

/// Sets or removes an env var and restores the previous value on drop.
/// Only use while holding the env lock.
pub(crate) struct EnvGuard {
    key: String,
    prev: Option<String>,
}

impl EnvGuard {
    pub(crate) fn set(key: &str, value: &str) -> Self {
        let prev = std::env::var(key).ok();
        std::env::set_var(key, value);
        Self {
            key: key.to_string(),
            prev,
        }
    }

    pub(crate) fn remove(key: &str) -> Self {
        let prev = std::env::var(key).ok();
        std::env::remove_var(key);
        Self {
            key: key.to_string(),
            prev,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => std::env::set_var(&self.key, v),
            None => std::env::remove_var(&self.key),
        }
    }
}
