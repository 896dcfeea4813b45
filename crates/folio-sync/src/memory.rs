use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use tokio::sync::Notify;

use folio_types::AssetPath;

use crate::error::{SyncError, SyncResult};
use crate::provider::{PersistenceProvider, WatchCallback, WatchEvent, WatchGuard};

type Watchers = RwLock<HashMap<u64, (AssetPath, Arc<WatchCallback>)>>;

/// In-memory, HashMap-based persistence provider.
///
/// Intended for tests and embedding. Changes made through
/// [`external_change`](Self::external_change) and
/// [`external_remove`](Self::external_remove) play the part of another
/// process editing the files and are reported to watchers; writes through
/// the provider trait are not.
pub struct InMemoryProvider {
    files: RwLock<HashMap<AssetPath, String>>,
    watchers: Arc<Watchers>,
    next_watch: AtomicU64,
    writes: AtomicUsize,
    fail_next_write: AtomicBool,
    fail_next_read: AtomicBool,
    write_gate: Mutex<Option<Arc<Notify>>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            watchers: Arc::new(RwLock::new(HashMap::new())),
            next_watch: AtomicU64::new(1),
            writes: AtomicUsize::new(0),
            fail_next_write: AtomicBool::new(false),
            fail_next_read: AtomicBool::new(false),
            write_gate: Mutex::new(None),
        }
    }

    /// Seed an asset without notifying watchers.
    pub fn insert(&self, path: &AssetPath, content: impl Into<String>) {
        self.files
            .write()
            .expect("lock poisoned")
            .insert(path.clone(), content.into());
    }

    /// The persisted content of `path`, if any.
    pub fn contents(&self, path: &AssetPath) -> Option<String> {
        self.files.read().expect("lock poisoned").get(path).cloned()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of live watches.
    pub fn watcher_count(&self) -> usize {
        self.watchers.read().expect("lock poisoned").len()
    }

    /// Make the next `write` fail with a transport error.
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }

    /// Make the next `read` fail with a transport error.
    pub fn fail_next_read(&self) {
        self.fail_next_read.store(true, Ordering::SeqCst);
    }

    /// Hold every write until `gate` is notified once per write. Used to
    /// observe the store while a write is in flight.
    pub fn gate_writes(&self, gate: Arc<Notify>) {
        *self.write_gate.lock().expect("lock poisoned") = Some(gate);
    }

    /// Simulate another process changing `path`.
    pub fn external_change(&self, path: &AssetPath, content: impl Into<String>) {
        let content = content.into();
        self.insert(path, content.clone());
        self.notify(path, WatchEvent::Changed(content));
    }

    /// Simulate another process deleting `path`.
    pub fn external_remove(&self, path: &AssetPath) {
        self.files.write().expect("lock poisoned").remove(path);
        self.notify(path, WatchEvent::Removed);
    }

    fn notify(&self, path: &AssetPath, event: WatchEvent) {
        // Callbacks run without the lock so they may register or drop watches.
        let callbacks: Vec<Arc<WatchCallback>> = self
            .watchers
            .read()
            .expect("lock poisoned")
            .values()
            .filter(|(watched, _)| watched == path)
            .map(|(_, callback)| callback.clone())
            .collect();
        for callback in callbacks {
            callback(event.clone());
        }
    }
}

impl Default for InMemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersistenceProvider for InMemoryProvider {
    async fn read(&self, path: &AssetPath) -> SyncResult<String> {
        if self.fail_next_read.swap(false, Ordering::SeqCst) {
            return Err(SyncError::Transport(format!("injected read failure for {path}")));
        }
        self.contents(path)
            .ok_or_else(|| SyncError::NotFound(path.clone()))
    }

    async fn write(&self, path: &AssetPath, content: &str) -> SyncResult<()> {
        let gate = self.write_gate.lock().expect("lock poisoned").clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(SyncError::Transport(format!("injected write failure for {path}")));
        }
        self.insert(path, content);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn watch(&self, path: &AssetPath, callback: WatchCallback) -> SyncResult<WatchGuard> {
        let id = self.next_watch.fetch_add(1, Ordering::Relaxed);
        self.watchers
            .write()
            .expect("lock poisoned")
            .insert(id, (path.clone(), Arc::new(callback)));

        let watchers = Arc::downgrade(&self.watchers);
        Ok(WatchGuard::new(move || {
            if let Some(watchers) = watchers.upgrade() {
                watchers.write().expect("lock poisoned").remove(&id);
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> AssetPath {
        AssetPath::new(s).unwrap()
    }

    #[tokio::test]
    async fn read_missing_is_not_found() {
        let provider = InMemoryProvider::new();
        let err = provider.read(&path("a.html")).await.unwrap_err();
        assert!(matches!(err, SyncError::NotFound(_)));
    }

    #[tokio::test]
    async fn write_then_read() {
        let provider = InMemoryProvider::new();
        let p = path("a.html");
        provider.write(&p, "<p>x</p>").await.unwrap();
        assert_eq!(provider.read(&p).await.unwrap(), "<p>x</p>");
        assert_eq!(provider.write_count(), 1);
    }

    #[tokio::test]
    async fn injected_failures_fire_once() {
        let provider = InMemoryProvider::new();
        let p = path("a.html");
        provider.insert(&p, "x");

        provider.fail_next_read();
        assert!(matches!(provider.read(&p).await, Err(SyncError::Transport(_))));
        assert_eq!(provider.read(&p).await.unwrap(), "x");

        provider.fail_next_write();
        assert!(provider.write(&p, "y").await.is_err());
        assert_eq!(provider.contents(&p).as_deref(), Some("x"));
        provider.write(&p, "y").await.unwrap();
        assert_eq!(provider.contents(&p).as_deref(), Some("y"));
    }

    #[test]
    fn watchers_see_external_changes_for_their_path_only() {
        let provider = InMemoryProvider::new();
        let seen: Arc<Mutex<Vec<WatchEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let guard = provider
            .watch(
                &path("a.html"),
                Box::new(move |event: WatchEvent| sink.lock().unwrap().push(event)),
            )
            .unwrap();

        provider.external_change(&path("a.html"), "new");
        provider.external_change(&path("b.html"), "other");
        provider.external_remove(&path("a.html"));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![WatchEvent::Changed("new".into()), WatchEvent::Removed]
        );
        assert_eq!(provider.watcher_count(), 1);
        drop(guard);
        assert_eq!(provider.watcher_count(), 0);
    }

    #[tokio::test]
    async fn own_writes_are_not_reported() {
        let provider = InMemoryProvider::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let _guard = provider
            .watch(
                &path("a.html"),
                Box::new(move |_: WatchEvent| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();
        provider.write(&path("a.html"), "mine").await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
