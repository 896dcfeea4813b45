//! Reactive in-memory asset store for Folio.
//!
//! The store owns one [`AssetEntry`] per asset path: the last accepted
//! content, an optional pending proposal from the writing agent, and whether
//! the content is known to match what the persistence provider holds.
//!
//! # Design Rules
//!
//! 1. An entry is readable only once it has been loaded from persistence.
//!    Reading earlier is a usage bug and fails with [`StoreError::NotLoaded`].
//! 2. Each operation is atomic and emits at most one [`StoreEvent`].
//! 3. Consumers get owned snapshots, never references into the store.
//! 4. A proposal is purely additive: writing or rejecting it never touches the
//!    accepted content or its sync state.
//! 5. Mutating one path has no visible effect on any other path.

pub mod draft;
pub mod entry;
pub mod error;
pub mod event;
pub mod router;
pub mod store;

pub use draft::ProposalDraft;
pub use entry::AssetEntry;
pub use error::{StoreError, StoreResult};
pub use event::{StoreEvent, StoreEventKind};
pub use router::{EventStream, Subscription};
pub use store::{AssetStore, Reconciled, StoreConfig};
