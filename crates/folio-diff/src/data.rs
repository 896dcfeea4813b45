//! Proposals on structured data assets.
//!
//! Data is never merged. A proposal is shown as two whole documents and the
//! user picks one side.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{DiffError, DiffResult};

/// One side of a proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The accepted content.
    Current,
    /// The pending proposed content.
    Proposed,
}

/// Accepted and proposed text of a data asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataProposal {
    pub current: String,
    pub proposed: String,
}

impl DataProposal {
    pub fn new(current: impl Into<String>, proposed: impl Into<String>) -> Self {
        Self {
            current: current.into(),
            proposed: proposed.into(),
        }
    }

    /// Exact text comparison. Reordered keys or reformatting count as a
    /// change.
    pub fn is_identical(&self) -> bool {
        self.current == self.proposed
    }

    pub fn choose(&self, side: Side) -> &str {
        match side {
            Side::Current => &self.current,
            Side::Proposed => &self.proposed,
        }
    }

    /// Parse one side. Empty text parses as an empty object.
    pub fn parse<T: DeserializeOwned>(&self, side: Side) -> DiffResult<T> {
        let text = self.choose(side);
        let text = if text.trim().is_empty() { "{}" } else { text };
        serde_json::from_str(text).map_err(|e| DiffError::Parse(format!("{side:?} side: {e}")))
    }
}
