//! Error types for configuration operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, saving or applying a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create directory
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Path of the directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// The configuration parsed but describes an unusable rack
    #[error("validation failed: {0}")]
    Validation(#[from] crate::validation::ValidationError),
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create a create directory error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::CreateDir {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;
    use std::error::Error;
    use std::path::Path;

    fn mock_io_err() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotFound, "mock")
    }

    #[test]
    fn factories_produce_matching_variants() {
        let err = ConfigError::read_file("/some/path", mock_io_err());
        assert!(matches!(err, ConfigError::ReadFile { ref path, .. } if path == Path::new("/some/path")));

        let err = ConfigError::write_file("/out/path", mock_io_err());
        assert!(matches!(err, ConfigError::WriteFile { ref path, .. } if path == Path::new("/out/path")));

        let err = ConfigError::create_dir("/dir", mock_io_err());
        assert!(matches!(err, ConfigError::CreateDir { ref path, .. } if path == Path::new("/dir")));
    }

    #[test]
    fn io_variants_display_path_and_expose_source() {
        let err = ConfigError::read_file("/a/rack.toml", mock_io_err());
        let msg = err.to_string();
        assert!(msg.contains("failed to read file"), "got: {msg}");
        assert!(msg.contains("/a/rack.toml"), "got: {msg}");
        assert!(err.source().is_some());

        let err = ConfigError::create_dir("/a", mock_io_err());
        assert!(err.to_string().contains("failed to create directory"));
        assert!(err.source().is_some());
    }

    #[test]
    fn validation_wraps_with_context() {
        let err = ConfigError::from(ValidationError::ZeroBlockSize);
        assert_eq!(err.to_string(), "validation failed: block size must be at least 1");
    }
}
