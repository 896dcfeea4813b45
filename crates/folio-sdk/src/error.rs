use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("invalid settings: {0}")]
    Settings(#[from] toml::de::Error),

    #[error("invalid asset path: {0}")]
    Path(#[from] folio_types::TypeError),

    #[error("store error: {0}")]
    Store(#[from] folio_store::StoreError),

    #[error("tree error: {0}")]
    Tree(#[from] folio_tree::TreeError),

    #[error("sync error: {0}")]
    Sync(#[from] folio_sync::SyncError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;
