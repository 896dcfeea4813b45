//! Sync coordination for Folio.
//!
//! Connects an [`AssetStore`](folio_store::AssetStore) to durable storage
//! through the [`PersistenceProvider`] trait. The coordinator loads assets on
//! first use, writes accepted edits back, and turns external changes into
//! store updates or explicit conflicts.
//!
//! # Modules
//!
//! - [`provider`] — The persistence seam and watch guards
//! - [`memory`] — In-memory provider with fault injection
//! - [`coordinator`] — [`SyncCoordinator`] and conflict resolution
//! - [`error`] — Error types

pub mod coordinator;
pub mod error;
pub mod memory;
pub mod provider;

pub use coordinator::{ExternalOutcome, Resolution, SyncCoordinator};
pub use error::{SyncError, SyncResult};
pub use memory::InMemoryProvider;
pub use provider::{PersistenceProvider, WatchCallback, WatchEvent, WatchGuard};
