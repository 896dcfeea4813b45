//! High-level SDK for Folio.
//!
//! [`Workspace`] bundles an asset store, its sync coordinator, and the
//! settings that classify assets. Applications embedding Folio start here.

pub mod error;
pub mod settings;
pub mod workspace;

pub use error::{SdkError, SdkResult};
pub use settings::Settings;
pub use workspace::Workspace;

// Re-export key types
pub use folio_diff::{BlockDiff, DataProposal, ProposalOverlay, SegmentKind, Side};
pub use folio_store::{AssetEntry, AssetStore, StoreEvent, StoreEventKind, Subscription};
pub use folio_sync::{InMemoryProvider, PersistenceProvider, Resolution, WatchEvent};
pub use folio_tree::{Ancestor, PageTree};
pub use folio_types::{AssetKind, AssetPath, PageId};
