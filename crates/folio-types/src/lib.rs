//! Foundation types for Folio.
//!
//! Folio keeps an in-memory record of documentation assets whose authoritative
//! copy lives in an external persistence provider. Every other Folio crate
//! depends on `folio-types` for the identifiers that tie those pieces together.
//!
//! # Key Types
//!
//! - [`AssetPath`] — Validated relative path identifying a persisted asset
//! - [`AssetKind`] — Markup page or opaque data blob, derived from the path
//! - [`PageId`] — Identifier of a node in the page hierarchy

pub mod asset;
pub mod error;
pub mod page;

pub use asset::{AssetKind, AssetPath};
pub use error::TypeError;
pub use page::{PageId, ROOT_PAGE_ID};
