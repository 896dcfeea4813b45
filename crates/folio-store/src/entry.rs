use serde::{Deserialize, Serialize};

/// The in-memory record of one asset.
///
/// Entries handed out by the store are snapshots: mutating a returned entry
/// has no effect on the store, and a snapshot may be stale after any
/// asynchronous suspension. Compare [`revision`](Self::revision) against a
/// fresh read to detect that.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    /// Last accepted serialized value.
    pub content: String,
    /// Pending alternative produced by the writing agent, if any.
    pub proposed_content: Option<String>,
    /// `content` is known to match the externally persisted value.
    pub synced: bool,
    /// The entry has been populated from persistence at least once.
    pub loaded: bool,
    /// Per-entry mutation counter. Starts at 1 and increases on every change.
    pub revision: u64,
}

impl AssetEntry {
    /// A freshly loaded entry.
    pub(crate) fn loaded(content: String) -> Self {
        Self {
            content,
            proposed_content: None,
            synced: true,
            loaded: true,
            revision: 1,
        }
    }

    /// A placeholder for an asset whose first read is still in flight.
    pub(crate) fn placeholder() -> Self {
        Self {
            content: String::new(),
            proposed_content: None,
            synced: false,
            loaded: false,
            revision: 1,
        }
    }

    /// Returns `true` if there is an open proposal.
    pub fn has_proposal(&self) -> bool {
        self.proposed_content.is_some()
    }

    /// The proposal when one is open, otherwise the accepted content.
    pub fn effective_content(&self) -> &str {
        self.proposed_content.as_deref().unwrap_or(&self.content)
    }
}
