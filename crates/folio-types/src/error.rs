use thiserror::Error;

/// Errors produced when constructing Folio identifiers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("asset path is empty")]
    EmptyPath,

    #[error("asset path must be relative: {0}")]
    AbsolutePath(String),

    #[error("asset path escapes the asset root: {0}")]
    ParentTraversal(String),

    #[error("page id is empty")]
    EmptyPageId,
}
