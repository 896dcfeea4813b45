//! Workspace settings, read from TOML.
//!
//! ```toml
//! event_capacity = 512
//! log_filter = "folio=debug"
//! markup_extensions = ["html", "htm", "mdx"]
//! ```
//!
//! Every key is optional; missing keys take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use folio_store::StoreConfig;
use folio_types::{AssetKind, AssetPath};

use crate::error::SdkResult;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Buffered store events per lagging stream subscriber.
    pub event_capacity: usize,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// File extensions (lowercase, without the dot) treated as markup and
    /// diffed block by block. Everything else is a data asset.
    pub markup_extensions: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            event_capacity: StoreConfig::default().event_capacity,
            log_filter: "info".into(),
            markup_extensions: ["html", "htm", "mdx", "md"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl Settings {
    pub fn from_toml_str(text: &str) -> SdkResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> SdkResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            event_capacity: self.event_capacity,
        }
    }

    /// Classify `path` by the configured markup extensions.
    pub fn kind_of(&self, path: &AssetPath) -> AssetKind {
        match path.extension() {
            Some(ext) if self.markup_extensions.iter().any(|m| m.eq_ignore_ascii_case(&ext)) => {
                AssetKind::Markup
            }
            _ => AssetKind::Data,
        }
    }
}
