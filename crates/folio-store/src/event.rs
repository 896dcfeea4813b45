use std::fmt;

use folio_types::AssetPath;

/// What happened to an entry in a single store operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreEventKind {
    /// A placeholder entry was created ahead of its first load.
    Registered,
    /// Content was (re)loaded from persistence.
    Loaded,
    /// Accepted content was edited locally.
    ContentUpdated,
    /// The proposal was written or replaced.
    ProposalUpdated,
    /// The proposal became the accepted content.
    ProposalAccepted,
    /// The proposal was discarded.
    ProposalRejected,
    /// Persistence confirmed the current content.
    Persisted,
    /// The entry was destroyed because its asset was deleted upstream.
    Removed,
}

impl fmt::Display for StoreEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Registered => "registered",
            Self::Loaded => "loaded",
            Self::ContentUpdated => "content_updated",
            Self::ProposalUpdated => "proposal_updated",
            Self::ProposalAccepted => "proposal_accepted",
            Self::ProposalRejected => "proposal_rejected",
            Self::Persisted => "persisted",
            Self::Removed => "removed",
        };
        f.write_str(name)
    }
}

/// Notification delivered once per mutating store operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreEvent {
    pub path: AssetPath,
    pub kind: StoreEventKind,
    /// Revision of the entry after the operation.
    pub revision: u64,
}

impl StoreEvent {
    pub fn new(path: AssetPath, kind: StoreEventKind, revision: u64) -> Self {
        Self {
            path,
            kind,
            revision,
        }
    }
}
