use std::fmt;

use async_trait::async_trait;

use folio_types::AssetPath;

use crate::error::SyncResult;

/// A change to an asset made outside this process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WatchEvent {
    Changed(String),
    Removed,
}

/// Callback invoked by a provider for every external change to a watched
/// asset.
pub type WatchCallback = Box<dyn Fn(WatchEvent) + Send + Sync>;

/// Durable storage behind the asset store.
///
/// Implementations decide what "durable" means (files on disk, a remote
/// service, a map in memory). They must not report the coordinator's own
/// writes back through [`watch`](Self::watch).
#[async_trait]
pub trait PersistenceProvider: Send + Sync {
    /// Read the persisted content. Fails with `NotFound` if the asset does
    /// not exist.
    async fn read(&self, path: &AssetPath) -> SyncResult<String>;

    async fn write(&self, path: &AssetPath, content: &str) -> SyncResult<()>;

    /// Start delivering external changes for `path` to `callback` until the
    /// returned guard is dropped.
    fn watch(&self, path: &AssetPath, callback: WatchCallback) -> SyncResult<WatchGuard>;
}

/// Keeps a provider watch alive. Dropping it stops delivery.
#[must_use = "the watch stops when the guard is dropped"]
pub struct WatchGuard {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl WatchGuard {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A guard for providers that cannot watch.
    pub fn inert() -> Self {
        Self { cancel: None }
    }
}

impl Drop for WatchGuard {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for WatchGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchGuard")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn guard_cancels_on_drop() {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        let guard = WatchGuard::new(move || flag.store(true, Ordering::SeqCst));
        assert!(!cancelled.load(Ordering::SeqCst));
        drop(guard);
        assert!(cancelled.load(Ordering::SeqCst));
    }

    #[test]
    fn inert_guard_is_harmless() {
        let guard = WatchGuard::inert();
        assert_eq!(format!("{guard:?}"), "WatchGuard { active: false }");
    }
}
