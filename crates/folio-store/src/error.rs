use folio_types::AssetPath;

/// Errors from asset store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No entry exists for the path.
    #[error("asset not found: {0}")]
    NotFound(AssetPath),

    /// The entry exists but has never been loaded from persistence.
    ///
    /// This is a usage bug (reading or editing before loading), not a
    /// transient condition, and should not be retried.
    #[error("asset {0} read before it was loaded")]
    NotLoaded(AssetPath),

    /// The content of a data asset is not valid for the requested type.
    #[error("malformed data in {path}: {message}")]
    Parse { path: AssetPath, message: String },

    /// A search/replace edit whose replacement equals its search text.
    #[error("edit of {0} would not change anything")]
    EditNoOp(AssetPath),

    /// The search text of an edit does not occur in the content.
    #[error("search text not found in {0}")]
    EditNotFound(AssetPath),

    /// The search text occurs more than once and the edit targets one match.
    #[error("search text occurs {occurrences} times in {path}; make it unique or replace all")]
    EditAmbiguous { path: AssetPath, occurrences: usize },

    /// A value could not be serialized for writing.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
