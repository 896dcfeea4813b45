//! Reconciles the asset store with its persistence provider.
//!
//! The coordinator moves content in both directions. Reads and external
//! changes flow into the store; accepted edits flow out to the provider.
//! An external change never overwrites an unsynced local edit. It is
//! reported as [`SyncError::Conflict`] and the caller picks a
//! [`Resolution`].
//!
//! Nothing retries on its own; every operation is safe to call again after a
//! failure.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use folio_store::{AssetEntry, AssetStore, Reconciled};
use folio_types::AssetPath;

use crate::error::{SyncError, SyncResult};
use crate::provider::{PersistenceProvider, WatchEvent, WatchGuard};

/// What an external event did to the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExternalOutcome {
    /// The store took the external content.
    Loaded,
    /// The store already held that content.
    Unchanged,
    /// The entry was dropped because the asset is gone.
    Removed,
}

/// How to settle a conflict between a local edit and an external change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Keep the local content and write it over the external one.
    KeepLocal,
    /// Discard the local edit and take this external content.
    TakeExternal(String),
    /// Discard the local edit because the asset was deleted upstream.
    AcceptRemoval,
}

type QueuedEvent = (AssetPath, WatchEvent);

pub struct SyncCoordinator {
    store: Arc<AssetStore>,
    provider: Arc<dyn PersistenceProvider>,
    queue_tx: mpsc::UnboundedSender<QueuedEvent>,
    queue_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<QueuedEvent>>,
    watches: Mutex<HashMap<AssetPath, WatchGuard>>,
}

impl SyncCoordinator {
    pub fn new(store: Arc<AssetStore>, provider: Arc<dyn PersistenceProvider>) -> Self {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        Self {
            store,
            provider,
            queue_tx,
            queue_rx: tokio::sync::Mutex::new(queue_rx),
            watches: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<AssetStore> {
        &self.store
    }

    pub fn provider(&self) -> &Arc<dyn PersistenceProvider> {
        &self.provider
    }

    // -----------------------------------------------------------------------
    // Inbound
    // -----------------------------------------------------------------------

    /// Make `path` available in the store and return its snapshot.
    ///
    /// A loaded entry is returned as is. Otherwise the content is read from
    /// the provider. If a local edit landed while the read was in flight the
    /// result goes through the same conflict rule as an external change.
    pub async fn open(&self, path: &AssetPath) -> SyncResult<AssetEntry> {
        match self.store.get(path) {
            Some(entry) if entry.loaded => return Ok(entry),
            Some(_) => {}
            None => self.store.register(path),
        }

        let content = self.provider.read(path).await?;
        self.apply_external(path, WatchEvent::Changed(content))?;
        info!(path = %path, "asset opened");
        Ok(self.store.entry(path)?)
    }

    /// Apply one external change to the store.
    ///
    /// Content from outside replaces the store's content only while the entry
    /// is synced (or not loaded yet). Against an unsynced edit it is a
    /// [`SyncError::Conflict`] and the store is left untouched, unless the
    /// external content equals the local edit, in which case the edit is
    /// simply marked synced.
    pub fn apply_external(&self, path: &AssetPath, event: WatchEvent) -> SyncResult<ExternalOutcome> {
        match event {
            WatchEvent::Changed(content) => match self.store.reconcile(path, content.as_str()) {
                Reconciled::Loaded => {
                    debug!(path = %path, "external content loaded");
                    Ok(ExternalOutcome::Loaded)
                }
                Reconciled::Removed | Reconciled::Unchanged => Ok(ExternalOutcome::Unchanged),
                Reconciled::Conflict => {
                    warn!(path = %path, "external change conflicts with local edit");
                    Err(SyncError::Conflict {
                        path: path.clone(),
                        external: Some(content),
                    })
                }
            },
            WatchEvent::Removed => match self.store.reconcile_removal(path) {
                Reconciled::Removed => {
                    debug!(path = %path, "asset removed upstream");
                    Ok(ExternalOutcome::Removed)
                }
                Reconciled::Loaded | Reconciled::Unchanged => Ok(ExternalOutcome::Unchanged),
                Reconciled::Conflict => {
                    warn!(path = %path, "external removal conflicts with local edit");
                    Err(SyncError::Conflict {
                        path: path.clone(),
                        external: None,
                    })
                }
            },
        }
    }

    // -----------------------------------------------------------------------
    // Outbound
    // -----------------------------------------------------------------------

    /// Write the entry's accepted content to the provider.
    ///
    /// Returns `true` if the entry is synced afterwards. If the content
    /// changed while the write was in flight the newer content stays unsynced
    /// and `false` is returned. A failed write leaves the entry unsynced and
    /// returns [`SyncError::Persist`].
    pub async fn persist(&self, path: &AssetPath) -> SyncResult<bool> {
        let content = self.store.entry(path)?.content;
        if let Err(e) = self.provider.write(path, &content).await {
            warn!(path = %path, error = %e, "persist failed");
            return Err(match e {
                SyncError::Persist { .. } => e,
                other => SyncError::Persist {
                    path: path.clone(),
                    message: other.to_string(),
                },
            });
        }
        let synced = self.store.mark_persisted(path, &content)?;
        debug!(path = %path, synced, "asset persisted");
        Ok(synced)
    }

    /// Replace the accepted content and persist it.
    pub async fn update_and_persist(
        &self,
        path: &AssetPath,
        content: impl Into<String>,
    ) -> SyncResult<bool> {
        self.store.update_content(path, content)?;
        self.persist(path).await
    }

    /// Accept the open proposal and persist the result.
    ///
    /// Returns `false` without writing if there is no proposal.
    pub async fn accept_and_persist(&self, path: &AssetPath) -> SyncResult<bool> {
        if !self.store.accept_proposed(path)? {
            return Ok(false);
        }
        self.persist(path).await
    }

    /// Settle a conflict reported by [`apply_external`](Self::apply_external).
    pub async fn resolve_conflict(&self, path: &AssetPath, resolution: Resolution) -> SyncResult<()> {
        info!(path = %path, ?resolution, "resolving conflict");
        match resolution {
            Resolution::KeepLocal => {
                self.persist(path).await?;
            }
            Resolution::TakeExternal(content) => self.store.load(path, content),
            Resolution::AcceptRemoval => {
                self.store.remove(path);
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Watching
    // -----------------------------------------------------------------------

    /// Queue external changes to `path` for [`next_change`](Self::next_change)
    /// and [`pump`](Self::pump). Watching a path twice replaces the old watch.
    pub fn watch(&self, path: &AssetPath) -> SyncResult<()> {
        let tx = self.queue_tx.clone();
        let watched = path.clone();
        let guard = self.provider.watch(
            path,
            Box::new(move |event: WatchEvent| {
                // The receiver lives as long as the coordinator.
                let _ = tx.send((watched.clone(), event));
            }),
        )?;
        self.watches
            .lock()
            .expect("lock poisoned")
            .insert(path.clone(), guard);
        debug!(path = %path, "watch started");
        Ok(())
    }

    /// Stop watching `path`. Returns `false` if it was not watched.
    pub fn unwatch(&self, path: &AssetPath) -> bool {
        self.watches
            .lock()
            .expect("lock poisoned")
            .remove(path)
            .is_some()
    }

    pub fn watched(&self) -> Vec<AssetPath> {
        let mut paths: Vec<AssetPath> = self
            .watches
            .lock()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect();
        paths.sort();
        paths
    }

    /// Wait for the next queued external change and apply it.
    ///
    /// The coordinator keeps a sender alive, so this only returns `None` if
    /// the runtime is shutting the channel down.
    pub async fn next_change(&self) -> Option<(AssetPath, SyncResult<ExternalOutcome>)> {
        let (path, event) = self.queue_rx.lock().await.recv().await?;
        let outcome = self.apply_external(&path, event);
        Some((path, outcome))
    }

    /// Apply every change queued so far, in arrival order.
    pub async fn pump(&self) -> Vec<(AssetPath, SyncResult<ExternalOutcome>)> {
        let mut rx = self.queue_rx.lock().await;
        let mut outcomes = Vec::new();
        while let Ok((path, event)) = rx.try_recv() {
            let outcome = self.apply_external(&path, event);
            outcomes.push((path, outcome));
        }
        outcomes
    }
}
