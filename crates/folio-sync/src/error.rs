use thiserror::Error;

use folio_types::AssetPath;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("asset not found in persistence: {0}")]
    NotFound(AssetPath),

    #[error("failed to persist {path}: {message}")]
    Persist { path: AssetPath, message: String },

    /// An external change arrived while the asset had unsaved local edits.
    /// `external` is `None` when the asset was removed upstream.
    #[error("external change to {path} conflicts with unsaved local edits")]
    Conflict {
        path: AssetPath,
        external: Option<String>,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("store error: {0}")]
    Store(#[from] folio_store::StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SyncResult<T> = Result<T, SyncError>;
