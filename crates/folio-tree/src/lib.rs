//! Page hierarchy for Folio.
//!
//! Pages form a forest under a reserved `"root"` id. The tree is stored
//! forward (each node lists its children); [`TreeIndex`] adds the reverse
//! lookup needed to resolve breadcrumbs.
//!
//! # Modules
//!
//! - [`tree`] — [`PageTree`] and [`PageNode`], construction and validation
//! - [`index`] — [`TreeIndex`] and [`ancestors`] resolution
//! - [`title`] — Title extraction from page markup
//! - [`render`] — ASCII rendering of asset listings
//! - [`error`] — Integrity errors

pub mod error;
pub mod index;
pub mod render;
pub mod title;
pub mod tree;

pub use error::{TreeError, TreeResult};
pub use index::{ancestors, Ancestor, TreeIndex};
pub use render::render_paths;
pub use title::{extract_title, UNTITLED};
pub use tree::{PageNode, PageTree};
