//! Error types for the page tree.

use folio_types::PageId;

/// Data-integrity violations in a page tree.
///
/// These are surfaced to the caller rather than resolved silently: a tree
/// that violates them has no well-defined hierarchy.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TreeError {
    /// A children list references an id that is not a node.
    #[error("dangling child reference: {parent} lists missing child {child}")]
    DanglingChild {
        /// The node containing the bad reference.
        parent: PageId,
        /// The missing child.
        child: PageId,
    },

    /// The same id appears in the children of two different nodes.
    #[error("page {child} has multiple parents: {first} and {second}")]
    MultipleParents {
        child: PageId,
        first: PageId,
        second: PageId,
    },

    /// A page is its own ancestor.
    #[error("cycle detected involving page {0}")]
    CycleDetected(PageId),

    /// The tree has no reserved root node.
    #[error("tree has no root node")]
    MissingRoot,

    /// A page key collides with the reserved root id.
    #[error("page key {0} collides with the reserved root id")]
    ReservedId(String),

    /// A page key is not a valid page id.
    #[error("invalid page key: {0}")]
    InvalidKey(String),
}

/// Convenience alias for tree results.
pub type TreeResult<T> = Result<T, TreeError>;
