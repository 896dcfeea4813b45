//! The proposal view of one asset.

use serde::Serialize;
use tracing::debug;

use folio_store::{AssetEntry, AssetStore};
use folio_types::{AssetKind, AssetPath};

use crate::block_diff::{diff_markup, BlockDiff};
use crate::data::{DataProposal, Side};
use crate::error::{DiffError, DiffResult};
use crate::markup::render_block_diff;

/// A pending proposal prepared for display.
///
/// Building an overlay never touches the store; it reads a snapshot. Only
/// [`resolve`] writes, and it does so through the store's accept/reject
/// operations.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProposalOverlay {
    Markup(BlockDiff),
    Data(DataProposal),
}

impl ProposalOverlay {
    /// Build the overlay for an entry snapshot, or `None` if it has no open
    /// proposal.
    pub fn for_entry(entry: &AssetEntry, kind: AssetKind) -> Option<Self> {
        let proposed = entry.proposed_content.as_deref()?;
        Some(if kind.supports_block_diff() {
            Self::Markup(diff_markup(&entry.content, proposed))
        } else {
            Self::Data(DataProposal::new(entry.content.clone(), proposed))
        })
    }

    /// Build the overlay for the asset at `path` from the store's current
    /// state.
    pub fn from_store(store: &AssetStore, path: &AssetPath) -> DiffResult<Self> {
        let entry = store.entry(path)?;
        Self::for_entry(&entry, path.kind()).ok_or_else(|| DiffError::NoProposal(path.clone()))
    }

    pub fn has_changes(&self) -> bool {
        match self {
            Self::Markup(diff) => diff.has_changes(),
            Self::Data(data) => !data.is_identical(),
        }
    }

    /// The full content of one side.
    pub fn content(&self, side: Side) -> String {
        match self {
            Self::Markup(diff) => diff.to_markup(side),
            Self::Data(data) => data.choose(side).to_string(),
        }
    }

    /// Markup with diff wrappers, for markup overlays.
    pub fn render_markup(&self) -> Option<String> {
        match self {
            Self::Markup(diff) => Some(render_block_diff(diff)),
            Self::Data(_) => None,
        }
    }
}

/// Settle the proposal on `path` by keeping one side.
///
/// Choosing [`Side::Proposed`] accepts it, [`Side::Current`] rejects it.
/// Returns `false` if there was no proposal to settle.
pub fn resolve(store: &AssetStore, path: &AssetPath, side: Side) -> DiffResult<bool> {
    let settled = match side {
        Side::Proposed => store.accept_proposed(path)?,
        Side::Current => store.reject_proposed(path)?,
    };
    debug!(path = %path, ?side, settled, "proposal resolved");
    Ok(settled)
}
