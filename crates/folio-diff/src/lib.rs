//! Proposal overlay for Folio.
//!
//! When an asset has a pending proposal, this crate computes how to present
//! it against the accepted content. Markup assets are aligned block by block
//! (a block is a top-level element such as a paragraph or a list); data
//! assets are offered as two whole documents to choose between.
//!
//! Everything here is a pure function of a snapshot, except [`resolve`],
//! which settles a proposal through the store.
//!
//! # Modules
//!
//! - [`block`] — Top-level block extraction and normalization
//! - [`block_diff`] — LCS alignment of block sequences
//! - [`markup`] — `<diff>` wrappers for editing surfaces
//! - [`inline`] — Word-level changes within a replaced block
//! - [`data`] — Whole-document proposals for data assets
//! - [`overlay`] — [`ProposalOverlay`] and [`resolve`]
//! - [`error`] — Error types

pub mod block;
pub mod block_diff;
pub mod data;
pub mod error;
pub mod inline;
pub mod markup;
pub mod overlay;

pub use block::{extract_blocks, Block};
pub use block_diff::{
    diff_blocks, diff_markup, BlockDiff, DiffSegment, DiffStats, RenderHint, SegmentKind,
};
pub use data::{DataProposal, Side};
pub use error::{DiffError, DiffResult};
pub use inline::{inline_block_changes, inline_changes, InlineChange};
pub use markup::{has_diff_markup, render_block_diff, render_diff_markup, strip_diff_markup};
pub use overlay::{resolve, ProposalOverlay};
