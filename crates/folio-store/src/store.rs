use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use folio_types::AssetPath;

use crate::draft::ProposalDraft;
use crate::entry::AssetEntry;
use crate::error::{StoreError, StoreResult};
use crate::event::{StoreEvent, StoreEventKind};
use crate::router::{EventRouter, EventStream, Subscription};

/// Result of applying an external observation with
/// [`AssetStore::reconcile`] or [`AssetStore::reconcile_removal`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reconciled {
    /// The external content was loaded.
    Loaded,
    /// The store already agreed with the external state.
    Unchanged,
    /// The entry was dropped.
    Removed,
    /// The entry holds an unsynced edit; nothing was changed.
    Conflict,
}

/// Configuration for the [`AssetStore`].
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Capacity of the broadcast channel behind [`AssetStore::events`].
    pub event_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            event_capacity: 256,
        }
    }
}

/// The in-memory record of every asset in a documentation workspace.
///
/// Each mutating call runs to completion under the store's write lock and
/// emits at most one [`StoreEvent`]. Events are delivered after the lock is
/// released, so observers may call back into the store. Reads return owned
/// snapshots; nothing outside the store holds a reference into an entry.
pub struct AssetStore {
    entries: RwLock<HashMap<AssetPath, AssetEntry>>,
    router: Arc<EventRouter>,
}

impl AssetStore {
    /// Create an empty store with the default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            router: EventRouter::new(config.event_capacity),
        }
    }

    // ---- Reads ----

    /// Snapshot of the entry at `path`, loaded or not.
    pub fn get(&self, path: &AssetPath) -> Option<AssetEntry> {
        self.entries
            .read()
            .expect("store lock poisoned")
            .get(path)
            .cloned()
    }

    /// Snapshot of a loaded entry.
    ///
    /// Fails with [`StoreError::NotFound`] when there is no entry and
    /// [`StoreError::NotLoaded`] when the entry has not been loaded yet.
    pub fn entry(&self, path: &AssetPath) -> StoreResult<AssetEntry> {
        let entry = self
            .get(path)
            .ok_or_else(|| StoreError::NotFound(path.clone()))?;
        if !entry.loaded {
            return Err(StoreError::NotLoaded(path.clone()));
        }
        Ok(entry)
    }

    /// Deserialize the accepted content of a data asset.
    pub fn read_data<T: DeserializeOwned>(&self, path: &AssetPath) -> StoreResult<T> {
        let entry = self.entry(path)?;
        parse_data(path, &entry.content)
    }

    /// Deserialize the proposal of a data asset, falling back to the accepted
    /// content when no proposal is open.
    pub fn read_proposed_data<T: DeserializeOwned>(&self, path: &AssetPath) -> StoreResult<T> {
        let entry = self.entry(path)?;
        parse_data(path, entry.effective_content())
    }

    /// All known paths, sorted.
    pub fn paths(&self) -> Vec<AssetPath> {
        let map = self.entries.read().expect("store lock poisoned");
        let mut paths: Vec<AssetPath> = map.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Number of entries, loaded or not.
    pub fn len(&self) -> usize {
        self.entries.read().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("store lock poisoned").is_empty()
    }

    // ---- Persistence-driven mutations ----

    /// Create a placeholder entry for a path whose first read is in flight.
    ///
    /// Does nothing if an entry already exists.
    pub fn register(&self, path: &AssetPath) {
        let event = {
            let mut map = self.entries.write().expect("store lock poisoned");
            if map.contains_key(path) {
                None
            } else {
                let entry = AssetEntry::placeholder();
                let revision = entry.revision;
                map.insert(path.clone(), entry);
                Some(StoreEvent::new(path.clone(), StoreEventKind::Registered, revision))
            }
        };
        self.emit(event);
    }

    /// Record the persisted content of an asset.
    ///
    /// Sets `content`, clears any proposal, and marks the entry loaded and
    /// synced. Loading the same content twice is a no-op.
    pub fn load(&self, path: &AssetPath, content: impl Into<String>) {
        let event = {
            let mut map = self.entries.write().expect("store lock poisoned");
            load_entry(&mut map, path, content.into())
        };
        if event.is_some() {
            debug!(path = %path, "asset loaded");
        }
        self.emit(event);
    }

    /// Apply content observed outside the store, unless it would overwrite
    /// an unsynced local edit.
    ///
    /// The check and the write happen under one lock acquisition, so a local
    /// edit cannot slip in between them.
    ///
    /// - Not loaded yet, or synced with different content: the content is
    ///   loaded and any proposal cleared.
    /// - Same content: nothing changes, except that an unsynced entry is
    ///   marked synced. The proposal is kept.
    /// - Unsynced with different content: [`Reconciled::Conflict`], and the
    ///   entry is untouched.
    pub fn reconcile(&self, path: &AssetPath, content: impl Into<String>) -> Reconciled {
        let content = content.into();
        let (outcome, event) = {
            let mut map = self.entries.write().expect("store lock poisoned");
            match map.get_mut(path) {
                Some(entry) if entry.loaded && entry.content == content => {
                    if entry.synced {
                        (Reconciled::Unchanged, None)
                    } else {
                        entry.synced = true;
                        entry.revision += 1;
                        let event =
                            StoreEvent::new(path.clone(), StoreEventKind::Persisted, entry.revision);
                        (Reconciled::Unchanged, Some(event))
                    }
                }
                Some(entry) if entry.loaded && !entry.synced => (Reconciled::Conflict, None),
                _ => (Reconciled::Loaded, load_entry(&mut map, path, content)),
            }
        };
        debug!(path = %path, ?outcome, "external content reconciled");
        self.emit(event);
        outcome
    }

    /// Drop the entry because its asset was deleted upstream, unless it holds
    /// an unsynced local edit. Checked and applied under one lock acquisition.
    pub fn reconcile_removal(&self, path: &AssetPath) -> Reconciled {
        let (outcome, event) = {
            let mut map = self.entries.write().expect("store lock poisoned");
            match map.get(path) {
                None => (Reconciled::Unchanged, None),
                Some(entry) if entry.loaded && !entry.synced => (Reconciled::Conflict, None),
                Some(_) => {
                    let revision = map.remove(path).map_or(1, |e| e.revision + 1);
                    let event = StoreEvent::new(path.clone(), StoreEventKind::Removed, revision);
                    (Reconciled::Removed, Some(event))
                }
            }
        };
        debug!(path = %path, ?outcome, "external removal reconciled");
        self.emit(event);
        outcome
    }

    /// Mark the entry synced if its content still equals `persisted`.
    ///
    /// Returns `true` if the entry is synced afterwards. When the content
    /// changed while the write was in flight, the entry stays unsynced and
    /// `false` is returned. Any open proposal is kept.
    pub fn mark_persisted(&self, path: &AssetPath, persisted: &str) -> StoreResult<bool> {
        let (synced, event) = {
            let mut map = self.entries.write().expect("store lock poisoned");
            let entry = loaded_mut(&mut map, path)?;
            if entry.content != persisted {
                (false, None)
            } else if entry.synced {
                (true, None)
            } else {
                entry.synced = true;
                entry.revision += 1;
                (
                    true,
                    Some(StoreEvent::new(path.clone(), StoreEventKind::Persisted, entry.revision)),
                )
            }
        };
        self.emit(event);
        Ok(synced)
    }

    /// Destroy the entry because its asset was deleted upstream.
    ///
    /// Returns the last snapshot of the entry, if there was one.
    pub fn remove(&self, path: &AssetPath) -> Option<AssetEntry> {
        let removed = self
            .entries
            .write()
            .expect("store lock poisoned")
            .remove(path);
        if let Some(entry) = &removed {
            debug!(path = %path, "asset removed");
            self.emit(Some(StoreEvent::new(
                path.clone(),
                StoreEventKind::Removed,
                entry.revision + 1,
            )));
        }
        removed
    }

    // ---- Local edits ----

    /// Replace the accepted content with a local edit.
    ///
    /// The entry becomes unsynced until persistence confirms the new value.
    /// An open proposal is left untouched.
    pub fn update_content(&self, path: &AssetPath, content: impl Into<String>) -> StoreResult<u64> {
        let content = content.into();
        self.mutate(path, StoreEventKind::ContentUpdated, |entry| {
            entry.content = content;
            entry.synced = false;
            true
        })
    }

    /// Write or replace the proposal. Accepted content and sync state are
    /// untouched.
    pub fn update_proposed_content(
        &self,
        path: &AssetPath,
        content: impl Into<String>,
    ) -> StoreResult<u64> {
        let content = content.into();
        self.mutate(path, StoreEventKind::ProposalUpdated, |entry| {
            entry.proposed_content = Some(content);
            true
        })
    }

    /// Apply a search/replace edit to the proposal.
    ///
    /// The edit starts from the open proposal, or from the accepted content
    /// when there is none, and its result becomes the proposal. `old` must
    /// occur exactly once unless `replace_all` is set. Lookup and write happen
    /// under one lock acquisition; a failed edit changes nothing.
    pub fn edit_proposed(
        &self,
        path: &AssetPath,
        old: &str,
        new: &str,
        replace_all: bool,
    ) -> StoreResult<u64> {
        if old == new {
            return Err(StoreError::EditNoOp(path.clone()));
        }
        let mut outcome = Ok(());
        let revision = self.mutate(path, StoreEventKind::ProposalUpdated, |entry| {
            let base = entry.effective_content();
            let occurrences = if old.is_empty() {
                0
            } else {
                base.matches(old).count()
            };
            outcome = match occurrences {
                0 => Err(StoreError::EditNotFound(path.clone())),
                n if n > 1 && !replace_all => Err(StoreError::EditAmbiguous {
                    path: path.clone(),
                    occurrences: n,
                }),
                _ => Ok(()),
            };
            if outcome.is_err() {
                return false;
            }
            let edited = if replace_all {
                base.replace(old, new)
            } else {
                base.replacen(old, new, 1)
            };
            entry.proposed_content = Some(edited);
            true
        })?;
        outcome?;
        Ok(revision)
    }

    /// Serialize `value` as pretty JSON and store it as the accepted content.
    pub fn write_data<T: Serialize>(&self, path: &AssetPath, value: &T) -> StoreResult<u64> {
        let serialized = serialize_data(value)?;
        self.update_content(path, serialized)
    }

    /// Serialize `value` as pretty JSON and store it as the proposal.
    pub fn write_proposed_data<T: Serialize>(&self, path: &AssetPath, value: &T) -> StoreResult<u64> {
        let serialized = serialize_data(value)?;
        self.update_proposed_content(path, serialized)
    }

    /// Make the open proposal the accepted content.
    ///
    /// Returns `false` without changing anything if there is no proposal.
    pub fn accept_proposed(&self, path: &AssetPath) -> StoreResult<bool> {
        let mut accepted = false;
        self.mutate(path, StoreEventKind::ProposalAccepted, |entry| {
            match entry.proposed_content.take() {
                Some(proposed) => {
                    entry.content = proposed;
                    entry.synced = false;
                    accepted = true;
                    true
                }
                None => false,
            }
        })?;
        if accepted {
            debug!(path = %path, "proposal accepted");
        }
        Ok(accepted)
    }

    /// Discard the open proposal. Rejecting when there is none is a no-op.
    ///
    /// Returns `true` if a proposal was discarded.
    pub fn reject_proposed(&self, path: &AssetPath) -> StoreResult<bool> {
        let mut rejected = false;
        self.mutate(path, StoreEventKind::ProposalRejected, |entry| {
            rejected = entry.proposed_content.take().is_some();
            rejected
        })?;
        if rejected {
            debug!(path = %path, "proposal rejected");
        }
        Ok(rejected)
    }

    /// Start staging a proposal that is generated incrementally.
    ///
    /// Nothing is visible in the store until [`ProposalDraft::commit`].
    pub fn begin_proposal(&self, path: &AssetPath) -> StoreResult<ProposalDraft<'_>> {
        let entry = self.entry(path)?;
        Ok(ProposalDraft::new(self, path.clone(), entry.revision))
    }

    // ---- Observation ----

    /// Register a callback invoked once per mutating operation.
    ///
    /// The callback stays registered until the returned [`Subscription`] is
    /// dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        self.router.subscribe(callback)
    }

    /// Receive store events over a broadcast channel.
    pub fn events(&self) -> EventStream {
        self.router.stream()
    }

    /// Number of registered callbacks.
    pub fn subscriber_count(&self) -> usize {
        self.router.observer_count()
    }

    // ---- Internals ----

    /// Apply `f` to a loaded entry. `f` returns whether it changed anything;
    /// changes bump the revision and emit one event of `kind`.
    fn mutate<F>(&self, path: &AssetPath, kind: StoreEventKind, f: F) -> StoreResult<u64>
    where
        F: FnOnce(&mut AssetEntry) -> bool,
    {
        let (revision, event) = {
            let mut map = self.entries.write().expect("store lock poisoned");
            let entry = loaded_mut(&mut map, path)?;
            if f(entry) {
                entry.revision += 1;
                (
                    entry.revision,
                    Some(StoreEvent::new(path.clone(), kind, entry.revision)),
                )
            } else {
                (entry.revision, None)
            }
        };
        if event.is_some() {
            debug!(path = %path, kind = %kind, revision, "asset mutated");
        }
        self.emit(event);
        Ok(revision)
    }

    fn emit(&self, event: Option<StoreEvent>) {
        if let Some(event) = event {
            self.router.route(&event);
        }
    }
}

impl Default for AssetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AssetStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetStore")
            .field("entry_count", &self.len())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

fn load_entry(
    map: &mut HashMap<AssetPath, AssetEntry>,
    path: &AssetPath,
    content: String,
) -> Option<StoreEvent> {
    match map.get_mut(path) {
        Some(entry) => {
            let unchanged = entry.loaded
                && entry.synced
                && entry.proposed_content.is_none()
                && entry.content == content;
            if unchanged {
                return None;
            }
            entry.content = content;
            entry.proposed_content = None;
            entry.loaded = true;
            entry.synced = true;
            entry.revision += 1;
            Some(StoreEvent::new(path.clone(), StoreEventKind::Loaded, entry.revision))
        }
        None => {
            let entry = AssetEntry::loaded(content);
            let revision = entry.revision;
            map.insert(path.clone(), entry);
            Some(StoreEvent::new(path.clone(), StoreEventKind::Loaded, revision))
        }
    }
}

fn loaded_mut<'a>(
    map: &'a mut HashMap<AssetPath, AssetEntry>,
    path: &AssetPath,
) -> StoreResult<&'a mut AssetEntry> {
    let entry = map
        .get_mut(path)
        .ok_or_else(|| StoreError::NotFound(path.clone()))?;
    if !entry.loaded {
        return Err(StoreError::NotLoaded(path.clone()));
    }
    Ok(entry)
}

/// Empty content stands for a freshly created data asset and reads as `{}`.
fn parse_data<T: DeserializeOwned>(path: &AssetPath, content: &str) -> StoreResult<T> {
    let result = if content.trim().is_empty() {
        serde_json::from_value(serde_json::Value::Object(serde_json::Map::new()))
    } else {
        serde_json::from_str(content)
    };
    result.map_err(|e| StoreError::Parse {
        path: path.clone(),
        message: e.to_string(),
    })
}

fn serialize_data<T: Serialize>(value: &T) -> StoreResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| StoreError::Serialization(e.to_string()))
}
