//! Error types for the diff crate.

use folio_types::AssetPath;

/// Errors that can occur while building or resolving a proposal overlay.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// The asset has no open proposal to diff or resolve.
    #[error("no open proposal for {0}")]
    NoProposal(AssetPath),

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] folio_store::StoreError),

    /// A side of a data proposal is not valid for the requested type.
    #[error("malformed data: {0}")]
    Parse(String),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
