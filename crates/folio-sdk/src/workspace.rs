use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use folio_diff::{ProposalOverlay, Side};
use folio_store::{AssetEntry, AssetStore};
use folio_sync::{PersistenceProvider, SyncCoordinator};
use folio_tree::{extract_title, Ancestor, PageTree};
use folio_types::{AssetKind, AssetPath};

use crate::error::SdkResult;
use crate::settings::Settings;

/// One documentation workspace: the asset store, its persistence, and the
/// views built on top of them.
///
/// The store is owned here and handed explicitly to the coordinator; nothing
/// is looked up from ambient state.
pub struct Workspace {
    settings: Settings,
    store: Arc<AssetStore>,
    sync: SyncCoordinator,
}

impl Workspace {
    pub fn new(settings: Settings, provider: Arc<dyn PersistenceProvider>) -> Self {
        let store = Arc::new(AssetStore::with_config(settings.store_config()));
        let sync = SyncCoordinator::new(store.clone(), provider);
        info!(event_capacity = settings.event_capacity, "workspace created");
        Self {
            settings,
            store,
            sync,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<AssetStore> {
        &self.store
    }

    pub fn sync(&self) -> &SyncCoordinator {
        &self.sync
    }

    pub fn kind_of(&self, path: &AssetPath) -> AssetKind {
        self.settings.kind_of(path)
    }

    // ---- Assets ----

    /// Load `path` from persistence if needed and return its snapshot.
    pub async fn open(&self, path: &AssetPath) -> SdkResult<AssetEntry> {
        Ok(self.sync.open(path).await?)
    }

    /// Open a data asset and parse its accepted content.
    pub async fn read_data<T: DeserializeOwned>(&self, path: &AssetPath) -> SdkResult<T> {
        self.sync.open(path).await?;
        Ok(self.store.read_data(path)?)
    }

    /// Open a data asset and parse its proposal, or its accepted content if
    /// there is no proposal.
    pub async fn read_proposed_data<T: DeserializeOwned>(&self, path: &AssetPath) -> SdkResult<T> {
        self.sync.open(path).await?;
        Ok(self.store.read_proposed_data(path)?)
    }

    /// Open a data asset, replace its content and persist it. Returns `true`
    /// if the asset is synced afterwards.
    pub async fn write_data<T: Serialize>(&self, path: &AssetPath, value: &T) -> SdkResult<bool> {
        self.sync.open(path).await?;
        self.store.write_data(path, value)?;
        Ok(self.sync.persist(path).await?)
    }

    /// Replace an asset's content and persist it.
    pub async fn save(&self, path: &AssetPath, content: impl Into<String>) -> SdkResult<bool> {
        Ok(self.sync.update_and_persist(path, content).await?)
    }

    // ---- Proposals ----

    /// Record a proposal for `path`. Nothing is persisted.
    pub fn propose(&self, path: &AssetPath, content: impl Into<String>) -> SdkResult<u64> {
        Ok(self.store.update_proposed_content(path, content)?)
    }

    /// Apply a search/replace edit to the proposal for `path`, starting from
    /// the accepted content when no proposal is open. Nothing is persisted.
    pub fn edit_proposal(
        &self,
        path: &AssetPath,
        old: &str,
        new: &str,
        replace_all: bool,
    ) -> SdkResult<u64> {
        Ok(self.store.edit_proposed(path, old, new, replace_all)?)
    }

    /// The overlay for the open proposal on `path`, classified by the
    /// workspace settings.
    pub fn overlay(&self, path: &AssetPath) -> SdkResult<Option<ProposalOverlay>> {
        let entry = self.store.entry(path)?;
        Ok(ProposalOverlay::for_entry(&entry, self.kind_of(path)))
    }

    /// Keep one side of the proposal on `path`.
    ///
    /// Keeping the proposed side accepts it and persists the new content;
    /// keeping the current side rejects it, which needs no write. Returns
    /// `false` if there was no proposal, or if the accepted content changed
    /// again before the write was confirmed.
    pub async fn resolve(&self, path: &AssetPath, side: Side) -> SdkResult<bool> {
        match side {
            Side::Proposed => Ok(self.sync.accept_and_persist(path).await?),
            Side::Current => Ok(self.store.reject_proposed(path)?),
        }
    }

    // ---- Pages ----

    /// Build the page tree from every loaded markup asset. A page's id is its
    /// path without the extension and its title comes from its first
    /// heading.
    pub fn page_tree(&self) -> SdkResult<PageTree> {
        let pages = self
            .store
            .paths()
            .into_iter()
            .filter(|path| self.kind_of(path) == AssetKind::Markup)
            .filter_map(|path| {
                let entry = self.store.get(&path)?;
                entry
                    .loaded
                    .then(|| (path.without_extension().to_string(), extract_title(&entry.content)))
            });
        Ok(PageTree::from_pages(pages)?)
    }

    /// Breadcrumb trail for `page_id` over the current page tree.
    pub fn breadcrumbs(&self, page_id: &str) -> SdkResult<Vec<Ancestor>> {
        Ok(self.page_tree()?.ancestors(page_id)?)
    }
}
