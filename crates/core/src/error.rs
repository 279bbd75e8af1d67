//! Top-level error type for the engine.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised outside the GPU layers: windowing, configuration and IO.
#[derive(Error, Debug)]
pub enum Error {
    /// Graphics API failure reported by a lower layer.
    #[error("Vulkan error: {0}")]
    Vulkan(String),

    /// Window creation or event loop failure.
    #[error("Window error: {0}")]
    Window(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file exists but could not be parsed.
    #[error("Config error in '{path}': {message}")]
    Config {
        /// File that failed to parse.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// Invariant broken inside the engine.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result alias using the engine's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_mentions_path() {
        let err = Error::Config {
            path: PathBuf::from("engine.toml"),
            message: "expected `=`".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("engine.toml"));
        assert!(text.contains("expected `=`"));
    }

    #[test]
    fn test_io_error_converts() {
        fn open() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))?;
            Ok(())
        }
        assert!(matches!(open(), Err(Error::Io(_))));
    }
}
