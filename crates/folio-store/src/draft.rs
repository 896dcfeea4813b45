use std::fmt;

use tracing::debug;

use folio_types::AssetPath;

use crate::error::StoreResult;
use crate::store::AssetStore;

/// A proposal being generated incrementally by the writing agent.
///
/// Chunks accumulate privately in the draft. The store only ever observes the
/// entry before the draft or with the complete proposal: [`commit`] applies
/// the full text in one operation, and dropping an uncommitted draft (for
/// example when the generating task is cancelled) discards it.
///
/// [`commit`]: ProposalDraft::commit
pub struct ProposalDraft<'a> {
    store: &'a AssetStore,
    path: AssetPath,
    base_revision: u64,
    buffer: String,
    committed: bool,
}

impl<'a> ProposalDraft<'a> {
    pub(crate) fn new(store: &'a AssetStore, path: AssetPath, base_revision: u64) -> Self {
        Self {
            store,
            path,
            base_revision,
            buffer: String::new(),
            committed: false,
        }
    }

    pub fn path(&self) -> &AssetPath {
        &self.path
    }

    /// Append a generated chunk.
    pub fn push_str(&mut self, chunk: &str) {
        self.buffer.push_str(chunk);
    }

    /// The text generated so far.
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Revision of the entry when the draft was started.
    pub fn base_revision(&self) -> u64 {
        self.base_revision
    }

    /// Returns `true` if the entry changed since the draft was started.
    pub fn is_stale(&self) -> bool {
        self.store
            .get(&self.path)
            .map_or(true, |entry| entry.revision != self.base_revision)
    }

    /// Publish the complete proposal. Returns the entry's new revision.
    pub fn commit(mut self) -> StoreResult<u64> {
        let text = std::mem::take(&mut self.buffer);
        let revision = self.store.update_proposed_content(&self.path, text)?;
        self.committed = true;
        Ok(revision)
    }
}

impl Drop for ProposalDraft<'_> {
    fn drop(&mut self) {
        if !self.committed {
            debug!(path = %self.path, bytes = self.buffer.len(), "proposal draft discarded");
        }
    }
}

impl fmt::Debug for ProposalDraft<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProposalDraft")
            .field("path", &self.path)
            .field("base_revision", &self.base_revision)
            .field("bytes", &self.buffer.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::event::StoreEventKind;
    use crate::{AssetStore, StoreError};
    use folio_types::AssetPath;

    fn path(s: &str) -> AssetPath {
        AssetPath::new(s).unwrap()
    }

    #[test]
    fn commit_publishes_whole_text_once() {
        let store = AssetStore::new();
        let p = path("page.html");
        store.load(&p, "<p>a</p>");

        let kinds = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&kinds);
        let _sub = store.subscribe(move |e| sink.lock().unwrap().push(e.kind));

        let mut draft = store.begin_proposal(&p).unwrap();
        draft.push_str("<p>a</p>");
        draft.push_str("<p>b</p>");
        assert_eq!(store.entry(&p).unwrap().proposed_content, None);

        draft.commit().unwrap();
        assert_eq!(
            store.entry(&p).unwrap().proposed_content.as_deref(),
            Some("<p>a</p><p>b</p>")
        );
        assert_eq!(*kinds.lock().unwrap(), vec![StoreEventKind::ProposalUpdated]);
    }

    #[test]
    fn dropped_draft_leaves_entry_untouched() {
        let store = AssetStore::new();
        let p = path("page.html");
        store.load(&p, "<p>a</p>");
        store.update_proposed_content(&p, "<p>old</p>").unwrap();
        let before = store.entry(&p).unwrap();

        {
            let mut draft = store.begin_proposal(&p).unwrap();
            draft.push_str("<p>trunc");
        }

        assert_eq!(store.entry(&p).unwrap(), before);
    }

    #[tokio::test]
    async fn cancelled_generation_is_all_or_nothing() {
        let store = Arc::new(AssetStore::new());
        let p = path("page.html");
        store.load(&p, "<p>a</p>");

        let task_store = Arc::clone(&store);
        let task_path = p.clone();
        let handle = tokio::spawn(async move {
            let mut draft = task_store.begin_proposal(&task_path).unwrap();
            draft.push_str("<p>partial");
            std::future::pending::<()>().await;
            draft.commit().unwrap();
        });
        tokio::task::yield_now().await;
        handle.abort();
        let _ = handle.await;

        assert_eq!(store.entry(&p).unwrap().proposed_content, None);
    }

    #[test]
    fn staleness_tracks_revision() {
        let store = AssetStore::new();
        let p = path("x");
        store.load(&p, "1");

        let draft = store.begin_proposal(&p).unwrap();
        assert!(!draft.is_stale());
        store.update_content(&p, "2").unwrap();
        assert!(draft.is_stale());
    }

    #[test]
    fn cannot_draft_unloaded_asset() {
        let store = AssetStore::new();
        let p = path("x");
        store.register(&p);
        assert!(matches!(
            store.begin_proposal(&p),
            Err(StoreError::NotLoaded(_))
        ));
    }
}
