use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Extensions treated as markup pages. Everything else is an opaque data blob.
const MARKUP_EXTENSIONS: &[&str] = &["html", "htm", "mdx", "md"];

/// Relative path of an asset inside a documentation workspace.
///
/// Paths use `/` as the separator regardless of platform, never start with a
/// separator, and never contain `..` segments. Two assets are the same asset
/// iff their paths are equal.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetPath(String);

impl AssetPath {
    /// Validate and normalize a path.
    pub fn new(path: impl Into<String>) -> Result<Self, TypeError> {
        let raw: String = path.into();
        let normalized = raw.replace('\\', "/");
        if normalized.trim().is_empty() {
            return Err(TypeError::EmptyPath);
        }
        if normalized.starts_with('/') {
            return Err(TypeError::AbsolutePath(raw));
        }
        if normalized.split('/').any(|segment| segment == "..") {
            return Err(TypeError::ParentTraversal(raw));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The file extension, lowercased, if any.
    pub fn extension(&self) -> Option<String> {
        let file_name = self.0.rsplit('/').next().unwrap_or(&self.0);
        let (stem, ext) = file_name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// The kind of asset this path refers to.
    pub fn kind(&self) -> AssetKind {
        AssetKind::from_extension(self.extension().as_deref())
    }

    /// The path with its extension removed (`guide/install.html` -> `guide/install`).
    ///
    /// Page ids in the page tree are derived this way.
    pub fn without_extension(&self) -> &str {
        match self.extension() {
            Some(ext) => &self.0[..self.0.len() - ext.len() - 1],
            None => &self.0,
        }
    }
}

impl fmt::Debug for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetPath({})", self.0)
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AssetPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AssetPath {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for AssetPath {
    type Error = TypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AssetPath> for String {
    fn from(path: AssetPath) -> Self {
        path.0
    }
}

/// Whether an asset is a markup page or an opaque data blob.
///
/// Markup pages support block-level proposal diffs. Data blobs are compared
/// and replaced as whole values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Markup,
    Data,
}

impl AssetKind {
    /// Classify by file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: Option<&str>) -> Self {
        match ext {
            Some(ext) if MARKUP_EXTENSIONS.iter().any(|m| m.eq_ignore_ascii_case(ext)) => {
                Self::Markup
            }
            _ => Self::Data,
        }
    }

    /// Returns `true` if proposals for this kind can be diffed block by block.
    pub fn supports_block_diff(self) -> bool {
        matches!(self, Self::Markup)
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Markup => f.write_str("markup"),
            Self::Data => f.write_str("data"),
        }
    }
}
