//! JSON configuration merging for Folio.
//!
//! Editor integrations are installed by adding one entry to an array inside
//! a tool's JSON settings file. The helpers here do that without disturbing
//! the rest of the document, and do it at most once.

pub mod error;
pub mod file;
pub mod nested;

pub use error::{ConfigError, ConfigResult};
pub use file::{AppendTarget, ConfigUpdate, JsonConfigFile};
pub use nested::{append_unique, get_nested_value, get_nested_value_mut, set_nested_value};
