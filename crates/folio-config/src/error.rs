//! Error types for configuration merging.

/// Errors that can occur while merging a JSON configuration document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The append target exists but holds something other than an array.
    #[error("value at {path:?} is {found}, not an array")]
    NotAnArray { path: String, found: &'static str },

    /// The existing document is not valid JSON.
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Reading or writing the configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
