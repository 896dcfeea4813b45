//! Installing an entry into a tool's JSON configuration file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ConfigResult;
use crate::nested::append_unique;

/// The array a configuration entry is appended to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppendTarget {
    /// Dot path of the array, e.g. `"permissions.allow"`.
    pub path: String,
    pub value: Value,
}

/// A JSON configuration file that should contain one particular entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonConfigFile {
    /// Directory relative to the project root.
    pub folder_path: PathBuf,
    pub file_name: String,
    /// Document written when the file does not exist yet.
    pub default_content: Value,
    pub append_to: AppendTarget,
}

/// Result of applying a [`JsonConfigFile`]. Every variant carries the
/// resulting document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigUpdate {
    Created(String),
    Updated(String),
    Unchanged(String),
}

impl ConfigUpdate {
    pub fn document(&self) -> &str {
        match self {
            Self::Created(doc) | Self::Updated(doc) | Self::Unchanged(doc) => doc,
        }
    }

    /// Returns `true` if the file needs to be written.
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged(_))
    }
}

impl JsonConfigFile {
    /// Where the file lives under `root`.
    pub fn location(&self, root: &Path) -> PathBuf {
        root.join(&self.folder_path).join(&self.file_name)
    }

    /// Merge the entry into `existing` (the current file text, or `None` if
    /// there is no file).
    ///
    /// A new document starts from `default_content`. Changed documents are
    /// pretty-printed with two-space indentation; an unchanged document is
    /// returned exactly as given.
    pub fn apply(&self, existing: Option<&str>) -> ConfigResult<ConfigUpdate> {
        let target = &self.append_to;
        match existing {
            None => {
                let mut doc = self.default_content.clone();
                append_unique(&mut doc, &target.path, target.value.clone())?;
                Ok(ConfigUpdate::Created(serde_json::to_string_pretty(&doc)?))
            }
            Some(text) => {
                let mut doc: Value = serde_json::from_str(text)?;
                if append_unique(&mut doc, &target.path, target.value.clone())? {
                    Ok(ConfigUpdate::Updated(serde_json::to_string_pretty(&doc)?))
                } else {
                    Ok(ConfigUpdate::Unchanged(text.to_string()))
                }
            }
        }
    }

    /// Read the file under `root`, merge the entry, and write it back if it
    /// changed. Missing directories are created.
    pub fn install(&self, root: &Path) -> ConfigResult<ConfigUpdate> {
        let location = self.location(root);
        let existing = match fs::read_to_string(&location) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        let update = self.apply(existing.as_deref())?;
        if update.is_change() {
            if let Some(dir) = location.parent() {
                fs::create_dir_all(dir)?;
            }
            fs::write(&location, update.document())?;
            info!(
                file = %location.display(),
                path = %self.append_to.path,
                created = matches!(update, ConfigUpdate::Created(_)),
                "configuration entry installed"
            );
        } else {
            debug!(file = %location.display(), "configuration entry already present");
        }
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use serde_json::json;

    fn instructions_file() -> JsonConfigFile {
        JsonConfigFile {
            folder_path: PathBuf::from(".agent"),
            file_name: "settings.json".into(),
            default_content: json!({"$schema": "https://example.invalid/schema.json"}),
            append_to: AppendTarget {
                path: "instructions".into(),
                value: json!("folio/AGENTS.md"),
            },
        }
    }

    #[test]
    fn missing_file_is_created_from_defaults() {
        let update = instructions_file().apply(None).unwrap();
        let ConfigUpdate::Created(doc) = &update else {
            panic!("expected Created, got {update:?}");
        };
        let value: Value = serde_json::from_str(doc).unwrap();
        assert_eq!(
            value,
            json!({
                "$schema": "https://example.invalid/schema.json",
                "instructions": ["folio/AGENTS.md"]
            })
        );
        assert!(doc.contains("\n  \"instructions\""));
    }

    #[test]
    fn existing_file_gains_entry() {
        let update = instructions_file()
            .apply(Some(r#"{"instructions": ["other.md"], "model": "x"}"#))
            .unwrap();
        assert!(matches!(update, ConfigUpdate::Updated(_)));
        let value: Value = serde_json::from_str(update.document()).unwrap();
        assert_eq!(value["instructions"], json!(["other.md", "folio/AGENTS.md"]));
        assert_eq!(value["model"], json!("x"));
    }

    #[test]
    fn present_entry_is_unchanged_verbatim() {
        let text = r#"{"instructions":["folio/AGENTS.md"]}"#;
        let update = instructions_file().apply(Some(text)).unwrap();
        assert_eq!(update, ConfigUpdate::Unchanged(text.to_string()));
        assert!(!update.is_change());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        assert!(matches!(
            instructions_file().apply(Some("{not json")),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn install_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        let file = instructions_file();

        let first = file.install(dir.path()).unwrap();
        assert!(matches!(first, ConfigUpdate::Created(_)));
        let location = dir.path().join(".agent/settings.json");
        assert_eq!(fs::read_to_string(&location).unwrap(), first.document());

        let second = file.install(dir.path()).unwrap();
        assert!(!second.is_change());
        assert_eq!(fs::read_to_string(&location).unwrap(), first.document());
    }
}
